// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cyclus type system generator CLI
//!
//! Loads a `dbtypes.json` type table and prints registry enumerations and
//! converter fragments.
//!
//! # Usage
//!
//! ```bash
//! # Registry overview for the newest version in the table
//! cyclus-typegen --dbtypes-json share/dbtypes.json summary
//!
//! # Names of a declared type
//! cyclus-typegen --dbtypes-json share/dbtypes.json names VECTOR_DOUBLE
//!
//! # Both converters of a nested spelling
//! cyclus-typegen --cyclus-version 1.5.3 convert "std::map<std::string, std::vector<double>>"
//!
//! # Using configuration file
//! cyclus-typegen --config typegen.yaml composition --basis atom
//! ```

mod config;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use config::TypegenConfig;
use cyclus_typesystem::{
    parse_template, Basis, Direction, Fragments, TypeRegistry, TypeTable, VersionSelector,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cyclus type system generator
#[derive(Parser, Debug)]
#[command(name = "cyclus-typegen")]
#[command(about = "Cyclus type system model and converter generation")]
#[command(version)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Type table path
    #[arg(long, global = true)]
    dbtypes_json: Option<PathBuf>,

    /// Cyclus version (defaults to the newest version in the table)
    #[arg(long, global = true)]
    cyclus_version: Option<String>,

    /// Namespace of the native enum header
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print declared, canonical and container types
    Summary,

    /// Print the derived names of a type
    Names {
        /// Declared type name or native spelling
        #[arg(value_name = "TYPE")]
        ty: String,
    },

    /// Print converter fragments of a type
    Convert {
        /// Declared type name or native spelling
        #[arg(value_name = "TYPE")]
        ty: String,

        /// Variable holding the value to convert
        #[arg(long, default_value = "x")]
        var: String,

        /// Conversion direction
        #[arg(long, value_enum, default_value_t = DirectionArg::Both)]
        direction: DirectionArg,
    },

    /// Print composition helper fragments
    Composition {
        /// Variable holding the composition
        #[arg(long, default_value = "c")]
        var: String,

        /// Quantity basis (mass or atom)
        #[arg(long, default_value = "mass")]
        basis: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    ToDynamic,
    ToNative,
    Both,
}

impl DirectionArg {
    fn directions(self) -> &'static [Direction] {
        match self {
            DirectionArg::ToDynamic => &[Direction::ToDynamic],
            DirectionArg::ToNative => &[Direction::ToNative],
            DirectionArg::Both => &[Direction::ToDynamic, Direction::ToNative],
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    // Initialize logging
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let registry = load_registry(&config)?;

    match args.command {
        Commands::Summary => cmd_summary(&registry),
        Commands::Names { ty } => cmd_names(&registry, &ty),
        Commands::Convert { ty, var, direction } => cmd_convert(&registry, &ty, &var, direction),
        Commands::Composition { var, basis } => cmd_composition(&registry, &var, &basis),
    }
}

fn build_config(args: &Args) -> anyhow::Result<TypegenConfig> {
    let mut config = match &args.config {
        Some(path) => TypegenConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => TypegenConfig::default(),
    };

    if let Some(path) = &args.dbtypes_json {
        config.dbtypes_json = path.clone();
    }
    if let Some(version) = &args.cyclus_version {
        config.cyclus_version = Some(version.clone());
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate().context("Invalid command-line overrides")?;
    Ok(config)
}

fn load_registry(config: &TypegenConfig) -> anyhow::Result<TypeRegistry> {
    let table = TypeTable::from_file(&config.dbtypes_json).with_context(|| {
        format!(
            "Failed to load type table {}",
            config.dbtypes_json.display()
        )
    })?;

    let selector = match &config.cyclus_version {
        Some(version) => VersionSelector::parse(version)?,
        None => table.latest_version().ok_or_else(|| {
            anyhow!(
                "Type table {} has no versioned rows",
                config.dbtypes_json.display()
            )
        })?,
    };
    tracing::info!("Using Cyclus version {}", selector);

    let registry = TypeRegistry::new(&table, &selector)
        .with_context(|| format!("Failed to build type registry for {}", selector))?
        .with_namespace(config.namespace.clone());
    Ok(registry)
}

fn cmd_summary(registry: &TypeRegistry) -> anyhow::Result<()> {
    println!("{:>5}  {:<32} {:>4}  {:<48} normal form", "id", "name", "rank", "C++ type");
    for name in registry.ordered_by_id() {
        let norm = registry
            .normal_form_of(name)
            .ok_or_else(|| anyhow!("{} has no normal form", name))?;
        println!(
            "{:>5}  {:<32} {:>4}  {:<48} {}",
            registry.id_of(name).unwrap_or_default(),
            name,
            registry.rank_of(name).unwrap_or_default(),
            registry.native_type_of(name).unwrap_or_default(),
            norm.tuple_repr()
        );
    }

    println!();
    println!("Canonical leaves: {}", registry.canonical_leaf_types().join(", "));
    for (head, names) in registry.canonical_templates_by_head() {
        println!("Canonical {}: {}", head, names.join(", "));
    }
    println!("Containers: {}", registry.container_types().join(", "));
    println!("Resources: {}", registry.resources().join(", "));

    let targets = registry.converter_targets()?;
    let report = SummaryReport {
        version: registry.selector().to_string(),
        declared: registry.ordered_by_id().len(),
        canonical: registry.canonical_types().len(),
        containers: registry.container_types().len(),
        routines: targets.len() * 2,
    };
    report.summary();
    Ok(())
}

fn cmd_names(registry: &TypeRegistry, ty: &str) -> anyhow::Result<()> {
    let norm = parse_template(ty)?;
    let resolved = registry.resolve(&norm);

    println!("normal form:   {}", resolved.tuple_repr());
    println!("runtime name:  {}", registry.runtime_type_name(&norm)?);
    println!("function name: {}", registry.function_name_fragment(&norm)?);
    println!("class name:    {}", registry.class_name_fragment(&norm)?);
    println!("storage:       {}", registry.storage_kind(&norm)?);
    for direction in [Direction::ToDynamic, Direction::ToNative] {
        println!(
            "{:<14} {}",
            format!("{}:", direction),
            registry.routine_name(direction, &norm)?
        );
    }
    if registry.is_declared(ty) {
        println!("enum symbol:   {}", registry.enum_symbol(ty)?);
    }
    Ok(())
}

fn cmd_convert(
    registry: &TypeRegistry,
    ty: &str,
    var: &str,
    direction: DirectionArg,
) -> anyhow::Result<()> {
    let norm = parse_template(ty)?;
    for &dir in direction.directions() {
        let fragments = registry
            .convert(dir, var, &norm)
            .with_context(|| format!("Failed to generate {} converter for {}", dir, ty))?;
        print_fragments(&registry.routine_name(dir, &norm)?, &fragments);
    }
    Ok(())
}

fn cmd_composition(registry: &TypeRegistry, var: &str, basis: &str) -> anyhow::Result<()> {
    let basis: Basis = basis.parse()?;
    print_fragments(
        &format!("composition_{}_to_cpp", basis),
        &registry.composition_to_native(var, basis)?,
    );
    print_fragments(
        &format!("composition_{}_to_py", basis),
        &registry.composition_to_dynamic(var, basis)?,
    );
    Ok(())
}

fn print_fragments(title: &str, fragments: &Fragments) {
    println!("# {}", title);
    println!("# declarations");
    println!("{}", fragments.declarations.trim_end());
    println!("# body");
    println!("{}", fragments.body.trim_end());
    println!("# result");
    println!("{}", fragments.result);
    println!();
}

/// Counts printed after `summary`.
#[derive(Debug, Default)]
struct SummaryReport {
    version: String,
    declared: usize,
    canonical: usize,
    containers: usize,
    routines: usize,
}

impl SummaryReport {
    fn summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  Cyclus Type System Report ({})", self.version);
        println!("{}", "=".repeat(60));
        println!();
        println!("  [OK] Declared types:   {}", self.declared);
        println!("  [OK] Canonical types:  {}", self.canonical);
        println!("  [OK] Containers:       {}", self.containers);
        println!(
            "  [OK] Converters:       {} (targets x 2 directions)",
            self.routines
        );
        println!();
        println!("{}", "=".repeat(60));
    }
}
