use baggage_core::config::{BaggageConfig, CliOverrides, CONFIG_FILE_NAME};
use baggage_core::{BaggageLoader, LoaderHost, LoaderOutput, LoaderRequest, SourceMap};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Baggage - inject require() statements into a module source
#[derive(Parser, Debug, Clone)]
#[command(name = "baggage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source file to transform
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Loader query, e.g. "?./log=dbg#logger&./styles.css"
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// Source map of the input file
    #[arg(long, value_name = "MAP")]
    source_map: Option<PathBuf>,

    /// Write the transformed source here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Write the updated source map here (default: <out>.map)
    #[arg(long, value_name = "FILE")]
    map_out: Option<PathBuf>,

    /// Append the updated source map to the output as a data URI
    #[arg(long)]
    inline_source_map: bool,

    /// Prefix for every injected module path
    #[arg(long, value_name = "PREFIX")]
    require_prefix: Option<String>,

    /// Comment placed above the injected statements
    #[arg(long, value_name = "TEXT")]
    banner: Option<String>,

    /// Request string recorded as the `file` of the updated source map
    #[arg(long, value_name = "REQUEST")]
    request: Option<String>,

    /// Path to baggage.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Write a baggage.yaml template to the current directory
    #[arg(long)]
    init: bool,

    /// Print diagnostics without color
    #[arg(long)]
    no_pretty: bool,
}

/// Host that records the loader's cacheability hint
#[derive(Debug, Default)]
struct CliHost {
    cacheable: Option<bool>,
}

impl LoaderHost for CliHost {
    fn cacheable(&mut self, cacheable: bool) {
        self.cacheable = Some(cacheable);
    }
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug to see every directive decision
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.init {
        init_project()?;
        return Ok(());
    }

    let Some(ref file) = cli.file else {
        return Err(anyhow::anyhow!(
            "No input file specified. Use --help for usage information."
        ));
    };

    let config = load_config(&cli)?;
    run(&cli, file, &config)
}

/// Write the configuration template
fn init_project() -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(anyhow::anyhow!("{} already exists", CONFIG_FILE_NAME));
    }

    BaggageConfig::init_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", CONFIG_FILE_NAME, e))?;
    println!("Created {}", CONFIG_FILE_NAME);
    Ok(())
}

/// Load configuration from file (if any) and apply CLI overrides
fn load_config(cli: &Cli) -> anyhow::Result<BaggageConfig> {
    let mut config = if let Some(ref project_path) = cli.project {
        BaggageConfig::from_file(project_path)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {}", e))?
    } else {
        let default_path = PathBuf::from(CONFIG_FILE_NAME);
        if default_path.exists() {
            BaggageConfig::from_file(&default_path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", CONFIG_FILE_NAME, e))?
        } else {
            BaggageConfig::default()
        }
    };

    let overrides = CliOverrides {
        require_prefix: cli.require_prefix.clone(),
        banner: cli.banner.clone(),
        query: cli.query.clone(),
        pretty: cli.no_pretty.then_some(false),
    };
    config.merge(&overrides);

    Ok(config)
}

fn run(cli: &Cli, file: &Path, config: &BaggageConfig) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;

    let source_map = match cli.source_map {
        Some(ref map_path) => {
            let json = std::fs::read_to_string(map_path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", map_path.display(), e))?;
            let map = SourceMap::from_json(&json)
                .map_err(|e| anyhow::anyhow!("Invalid source map {}: {}", map_path.display(), e))?;
            Some(map.to_value()?)
        }
        None => None,
    };

    let resource_path = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    let query = config.effective_query();
    debug!("Query for {}: {:?}", resource_path.display(), query);

    let mut request = LoaderRequest::new(&resource_path, &query);
    if let Some(ref request_string) = cli.request {
        request = request.with_request(request_string);
    }

    let loader = BaggageLoader::from_config(config);
    let mut host = CliHost::default();
    let output = loader
        .run(&request, &source, source_map.as_ref(), &mut host)
        .map_err(|e| anyhow::anyhow!("Failed to transform {}: {}", file.display(), e))?;
    debug!("Cacheable: {:?}", host.cacheable);

    write_output(cli, output)
}

fn write_output(cli: &Cli, output: LoaderOutput) -> anyhow::Result<()> {
    let (mut code, map) = output.into_parts();

    if let Some(map) = map {
        let map = SourceMap::from_value(&map)?;
        if cli.inline_source_map {
            code.push('\n');
            code.push_str(&map.to_comment()?);
            code.push('\n');
        } else if let Some(map_path) = map_output_path(cli) {
            std::fs::write(&map_path, map.to_json()?)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", map_path.display(), e))?;
            info!("Wrote source map {}", map_path.display());
        } else {
            warn!("Source map discarded; pass --map-out or --inline-source-map to keep it");
        }
    }

    match cli.out {
        Some(ref out) => {
            std::fs::write(out, code)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", out.display(), e))?;
            info!("Wrote {}", out.display());
        }
        None => print!("{}", code),
    }

    Ok(())
}

/// `--map-out`, or `<out>.map` next to `--out`
fn map_output_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(ref map_out) = cli.map_out {
        return Some(map_out.clone());
    }

    cli.out.as_ref().map(|out| {
        let mut name = out.as_os_str().to_os_string();
        name.push(".map");
        PathBuf::from(name)
    })
}
