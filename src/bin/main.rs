//! Quarry CLI - compile search requests and query models to SQL
//!
//! Usage:
//!   quarry compile <request.json> [--domain <domain>] [--readable <ids>] [--dialect <dialect>]
//!   quarry render <model.json> [--domain <domain>] [--dialect <dialect>]
//!   quarry catalog [--entity <entity>] [--all]
//!   quarry ops <role> <data-type>
//!
//! Examples:
//!   quarry compile search.json --readable 1,2,3 --sort name:desc --page 0
//!   quarry compile search.json --domain requirement-version --count
//!   quarry ops filter NUMERIC
//!   RUST_LOG=quarry=debug quarry compile search.json

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use quarry::adapter::{presets, AdapterError, ExecutionAdapter, Page, SharedHandler, SqlAdapter, SqlBindings};
use quarry::catalog::{legal_operations, Catalog, CatalogError, ColumnRole, DataType, EntityType};
use quarry::compiler::{CompileError, SearchCompiler, SearchDomain, StaticScopeSecurity};
use quarry::config::{Settings, SettingsError};
use quarry::mapping::MappingError;
use quarry::model::{QueryModel, WireQueryModel};
use quarry::search::{SearchRequest, SortEntry};
use quarry::sql::{Dialect, Statement};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Quarry - compile search screens to parameterized SQL")]
#[command(version)]
struct Cli {
    /// Config file (defaults to QUARRY_CONFIG, ./quarry.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log compiler decisions to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a search request to SQL
    Compile {
        /// JSON search request: { "criteria": { key: field }, "sort": [...] }
        file: PathBuf,

        #[arg(long, default_value = "test-case")]
        domain: DomainArg,

        /// Readable scope ids, comma separated
        #[arg(long, value_delimiter = ',')]
        readable: Vec<i64>,

        /// Extra sort entries: key, key:asc or key:desc
        #[arg(long)]
        sort: Vec<String>,

        /// SQL dialect (overrides the config file)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Zero-based page to fetch
        #[arg(long)]
        page: Option<u64>,

        #[arg(long, default_value_t = 25)]
        page_size: u64,

        /// Emit the count query instead of the fetch query
        #[arg(long)]
        count: bool,

        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Render a serialized query model to SQL
    Render {
        /// JSON query model
        file: PathBuf,

        #[arg(long, default_value = "test-case")]
        domain: DomainArg,

        #[arg(short, long)]
        dialect: Option<DialectArg>,

        #[arg(long)]
        count: bool,
    },

    /// List catalog columns
    Catalog {
        /// Only columns of this entity (e.g. TEST_CASE)
        #[arg(long)]
        entity: Option<String>,

        /// Include columns hidden from end users
        #[arg(long)]
        all: bool,
    },

    /// List the operations legal for a role and data type
    Ops {
        /// AXIS, MEASURE or FILTER
        role: String,

        /// e.g. NUMERIC, STRING, DATE
        data_type: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    TestCase,
    RequirementVersion,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Mysql,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// SQL followed by its parameters
    Sql,
    /// The compiled query model as JSON
    Model,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Settings(#[from] SettingsError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Mapping(#[from] MappingError),
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Adapter(#[from] AdapterError),
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            file,
            domain,
            readable,
            sort,
            dialect,
            page,
            page_size,
            count,
            output,
        } => load_env(cli.config, domain, dialect).and_then(|env| {
            let page = page.map(|n| Page::new(n, page_size));
            cmd_compile(&env, file, readable, sort, page, count, output)
        }),
        Commands::Render {
            file,
            domain,
            dialect,
            count,
        } => load_env(cli.config, domain, dialect).and_then(|env| cmd_render(&env, file, count)),
        Commands::Catalog { entity, all } => {
            load_settings(cli.config).and_then(|s| cmd_catalog(&s, entity, all))
        }
        Commands::Ops { role, data_type } => cmd_ops(&role, &data_type),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Everything a compilation needs, resolved from the config and flags.
struct Env {
    settings: Settings,
    catalog: Catalog,
    domain: SearchDomain<SharedHandler>,
    bindings: SqlBindings,
    dialect: Dialect,
}

fn load_settings(path: Option<PathBuf>) -> CliResult<Settings> {
    Ok(match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    })
}

fn load_catalog(settings: &Settings) -> CliResult<Catalog> {
    Ok(match settings.sql.catalog_path()? {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::builtin().clone(),
    })
}

fn load_env(config: Option<PathBuf>, domain: DomainArg, dialect: Option<DialectArg>) -> CliResult<Env> {
    let settings = load_settings(config)?;
    let catalog = load_catalog(&settings)?;

    let (domain, preset) = match domain {
        DomainArg::TestCase => (presets::test_case_domain()?, presets::test_case_bindings()?),
        DomainArg::RequirementVersion => (
            presets::requirement_version_domain()?,
            presets::requirement_version_bindings()?,
        ),
    };
    let bindings = match settings.sql.bindings_path()? {
        Some(path) => SqlBindings::from_file(path)?,
        None => preset,
    };
    let dialect = dialect.map(Dialect::from).unwrap_or(settings.sql.dialect);

    Ok(Env {
        settings,
        catalog,
        domain,
        bindings,
        dialect,
    })
}

fn adapter(env: &Env) -> SqlAdapter<'_> {
    SqlAdapter::new(&env.bindings, env.dialect)
        .with_fulltext_or_token(&env.settings.compiler.fulltext_or_token)
}

fn cmd_compile(
    env: &Env,
    file: PathBuf,
    readable: Vec<i64>,
    sort: Vec<String>,
    page: Option<Page>,
    count: bool,
    output: OutputFormat,
) -> CliResult<()> {
    let mut request: SearchRequest = serde_json::from_str(&fs::read_to_string(&file)?)?;
    for spec in &sort {
        let entry = SortEntry::parse(spec)
            .ok_or_else(|| CliError::Usage(format!("invalid sort entry '{}'", spec)))?;
        request = request.sorted_by(entry);
    }

    let security = StaticScopeSecurity::new(readable);
    let compiled = SearchCompiler::new(&env.catalog, &env.domain, &security)
        .with_settings(env.settings.compiler.clone())
        .compile(&request)?;

    if let OutputFormat::Model = output {
        let wire = WireQueryModel::from(&compiled.model);
        println!("{}", serde_json::to_string_pretty(&wire)?);
        return Ok(());
    }

    let adapter = adapter(env);
    let statement = if count {
        adapter.count(&compiled)?
    } else {
        let fetch = adapter.fetch(&compiled)?;
        match page {
            Some(page) => fetch.paged(page).to_statement(),
            None => fetch.to_statement(),
        }
    };
    print_statement(&statement)
}

fn cmd_render(env: &Env, file: PathBuf, count: bool) -> CliResult<()> {
    let wire: WireQueryModel = serde_json::from_str(&fs::read_to_string(&file)?)?;
    let model: QueryModel = wire.bind(&env.catalog)?;

    let adapter = adapter(env);
    let statement = if count {
        adapter.compile_count(&model, &[])?
    } else {
        adapter.compile_fetch(&model, &[], &[])?.to_statement()
    };
    print_statement(&statement)
}

fn print_statement(statement: &Statement) -> CliResult<()> {
    println!("{}", statement.sql);
    if !statement.params.is_empty() {
        println!();
        println!("-- params: {}", serde_json::to_string(&statement.params)?);
    }
    Ok(())
}

/// Warnings by default; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_catalog(settings: &Settings, entity: Option<String>, all: bool) -> CliResult<()> {
    let catalog = load_catalog(settings)?;
    let entity = entity
        .map(|name| {
            EntityType::from_str(&name)
                .ok_or_else(|| CliError::Usage(format!("unknown entity '{}'", name)))
        })
        .transpose()?;

    let mut columns: Vec<_> = match entity {
        Some(entity) => catalog.columns_of(entity).collect(),
        None => catalog.iter().collect(),
    };
    columns.retain(|c| all || c.business);
    columns.sort_by_key(|c| c.id);

    for column in columns {
        let roles: Vec<_> = column.roles.iter().map(|r| r.as_str()).collect();
        println!(
            "{:<40} {:<12} {:<18} {}",
            column.label,
            column.specialized_type,
            column.data_type,
            roles.join(",")
        );
    }
    Ok(())
}

fn cmd_ops(role: &str, data_type: &str) -> CliResult<()> {
    let role = ColumnRole::from_str(role)
        .ok_or_else(|| CliError::Usage(format!("unknown role '{}'", role)))?;
    let data_type = DataType::from_str(data_type)
        .ok_or_else(|| CliError::Usage(format!("unknown data type '{}'", data_type)))?;

    for operation in legal_operations(role, data_type) {
        println!("{}", operation);
    }
    Ok(())
}
