//! The `entscan` command line
//!
//! Each verb maps onto one builder terminal method; results are printed to
//! stdout in the chosen [`Format`]. Logging goes to stderr and is controlled
//! by the `ENTSCAN_LOG` environment variable.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use entscan_engine::config::LookupConfig;
use entscan_engine::join::JoinOptions;
use entscan_engine::lookup::{ProcessTypeLookup, lookup_all};
use entscan_engine::query::{AggregateFunction, AggregateOptions, MISSING_KEY, NULL_KEY, QueryOptions};
use entscan_engine::relationships::RelationshipOptions;
use entscan_engine::sample::SampleOptions;
use entscan_engine::schema::SchemaOptions;
use entscan_engine::stream::DEFAULT_SUB_PATH;
use tracing_subscriber::EnvFilter;

use crate::builder::ScanBuilder;
use crate::render::{AggregateReport, Format, Render, render};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "ENTSCAN_LOG";

#[derive(Debug, Parser)]
#[command(name = "entscan")]
#[command(about = "Query very large JSON entity dumps without loading them", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Dotted path of the array to stream; empty for a root-level array
    #[arg(long, global = true, default_value = DEFAULT_SUB_PATH)]
    pub sub_path: String,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Fail on filter expressions that do not parse
    #[arg(long, global = true)]
    pub strict_filters: bool,

    /// Bytes read per chunk
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Infer the merged schema of a whole document
    Schema(SchemaArgs),
    /// Reservoir-sample elements
    Sample(SampleArgs),
    /// Select a page of matching elements
    Query(QueryArgs),
    /// Count matching elements
    Count(CountArgs),
    /// Count elements per distinct value of a path
    Group(PathArgs),
    /// Count, sum, average, minimum and maximum of a numeric path
    Stats(PathArgs),
    /// Histogram of a numeric path
    Distribution(DistributionArgs),
    /// Numeric aggregates per group
    Aggregate(AggregateArgs),
    /// Detect id relationships between two files
    Relationships(RelationshipArgs),
    /// Hash-join two files on equal key values
    Join(JoinArgs),
    /// Resolve type names through an external knowledge-base process
    Lookup(LookupArgs),
}

/// Filter expressions shared by most verbs
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Filter such as `payload.level >= 10`; repeat to AND several
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    pub file: PathBuf,

    /// Containers nested deeper than this are shown by kind only
    #[arg(long, default_value_t = 8)]
    pub max_depth: usize,

    /// Example strings kept per position
    #[arg(long, default_value_t = 3)]
    pub max_samples: usize,

    /// Keep raw examples instead of tagging ids, dates and GUIDs
    #[arg(long)]
    pub no_patterns: bool,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    pub file: PathBuf,

    /// Number of elements to sample
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,

    /// Sample the value at this path instead of whole elements
    #[arg(long)]
    pub path: Option<String>,

    /// Only elements of this entity type (entityId prefix or payload.$type)
    #[arg(long)]
    pub entity_type: Option<String>,

    /// Seed for a reproducible sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Clip strings longer than this many characters; 0 disables clipping
    #[arg(long, default_value_t = 200)]
    pub truncate: usize,

    /// Summarize containers nested deeper than this
    #[arg(long, default_value_t = 4)]
    pub depth: usize,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    pub file: PathBuf,

    /// Output field path; `path.length` yields a length. Repeat for several
    #[arg(short, long)]
    pub select: Vec<String>,

    /// Maximum items returned
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Matching elements skipped before collecting
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct CountArgs {
    pub file: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    pub file: PathBuf,

    /// Path expression such as `payload.level`
    pub path: String,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct DistributionArgs {
    pub file: PathBuf,

    pub path: String,

    /// Number of equal-width buckets
    #[arg(short, long)]
    pub buckets: Option<usize>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    pub file: PathBuf,

    /// Path whose values name the groups
    #[arg(long)]
    pub group_by: String,

    /// Numeric path aggregated within each group
    #[arg(long)]
    pub value: String,

    /// Functions shown as text columns (count, sum, avg, min, max, countIf)
    #[arg(long = "function", value_parser = parse_function)]
    pub functions: Vec<AggregateFunction>,

    /// Condition counted per group as `countIf`
    #[arg(long)]
    pub count_if: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct RelationshipArgs {
    pub left: PathBuf,
    pub right: PathBuf,

    /// Minimum coverage percentage
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Also list every id field found in each file
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    pub left: PathBuf,
    pub right: PathBuf,

    /// Key path in the left file; detected when omitted
    #[arg(long)]
    pub left_key: Option<String>,

    /// Key path in the right file; detected when omitted
    #[arg(long)]
    pub right_key: Option<String>,

    /// Output field with an `a.` (left) or `b.` (right) prefix. Repeat for several
    #[arg(short, long)]
    pub select: Vec<String>,

    /// Maximum pairs returned
    #[arg(short, long)]
    pub limit: Option<usize>,

    // Pair filter; paths may carry `a.`/`b.` prefixes
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Type names to resolve
    pub type_names: Vec<String>,

    /// Also resolve every distinct `payload.$type` in this file
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Knowledge-base executable
    #[arg(long, env = "ENTSCAN_LOOKUP_PROGRAM")]
    pub program: String,

    /// Argument passed to the executable. Repeat for several
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,
}

fn parse_function(text: &str) -> std::result::Result<AggregateFunction, String> {
    text.parse().map_err(|e: entscan_engine::Error| e.to_string())
}

/// Install the stderr log subscriber
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

impl GlobalArgs {
    fn builder(&self, file: PathBuf, filter: Option<&FilterArgs>) -> ScanBuilder {
        let mut builder = ScanBuilder::new(file)
            .sub_path(self.sub_path.clone())
            .strict_filters(self.strict_filters);
        if let Some(chunk_size) = self.chunk_size {
            builder = builder.chunk_size(chunk_size);
        }
        if let Some(filter) = filter {
            builder = builder.filters(filter.filters.iter().cloned());
        }
        builder
    }
}

/// Process exit status for a failed run: `2` when different input could
/// succeed (bad paths, filters, arguments, no detectable join key), `1` for
/// everything else.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<entscan_engine::Error>() {
        Some(engine_error) if engine_error.is_recoverable() => 2,
        _ => 1,
    }
}

fn emit<T: Render>(value: &T, format: Format) -> Result<()> {
    let text = render(value, format).context("failed to encode output")?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write output")
}

/// `$type` names with the assembly suffix removed
fn type_name(raw: &str) -> &str {
    raw.split(',').next().unwrap_or(raw).trim()
}

/// Run one parsed command line.
///
/// # Errors
///
/// Returns the failing operation's error with the file it was working on.
pub async fn run(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;
    let format = global.format;

    match command {
        Command::Schema(args) => {
            let options = SchemaOptions {
                max_depth: args.max_depth,
                max_samples: args.max_samples,
                detect_patterns: !args.no_patterns,
            };
            let schema = global
                .builder(args.file.clone(), None)
                .schema(options)
                .await
                .with_context(|| format!("schema of {}", args.file.display()))?;
            emit(&schema, format)
        }
        Command::Sample(args) => {
            let options = SampleOptions {
                count: args.count,
                path: args.path,
                entity_type: args.entity_type,
                filter: None,
                seed: args.seed,
                truncate_strings: args.truncate,
                max_depth: args.depth,
            };
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .sample(options)
                .await
                .with_context(|| format!("sampling {}", args.file.display()))?;
            emit(&result, format)
        }
        Command::Query(args) => {
            let mut options = QueryOptions::new().with_select(args.select).with_offset(args.offset);
            if let Some(limit) = args.limit {
                options = options.with_limit(limit);
            }
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .query(options)
                .await
                .with_context(|| format!("querying {}", args.file.display()))?;
            emit(&result, format)
        }
        Command::Count(args) => {
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .count()
                .await
                .with_context(|| format!("counting {}", args.file.display()))?;
            emit(&result, format)
        }
        Command::Group(args) => {
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .group_by(&args.path)
                .await
                .with_context(|| format!("grouping {} by {}", args.file.display(), args.path))?;
            emit(&result, format)
        }
        Command::Stats(args) => {
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .stats(&args.path)
                .await
                .with_context(|| format!("stats of {} in {}", args.path, args.file.display()))?;
            emit(&result, format)
        }
        Command::Distribution(args) => {
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .distribution(&args.path, args.buckets)
                .await
                .with_context(|| format!("distribution of {} in {}", args.path, args.file.display()))?;
            emit(&result, format)
        }
        Command::Aggregate(args) => {
            let mut options = AggregateOptions::new(args.group_by, args.value);
            if let Some(condition) = args.count_if {
                options = options.with_count_if(condition);
            }
            let result = global
                .builder(args.file.clone(), Some(&args.filter))
                .aggregate(options)
                .await
                .with_context(|| format!("aggregating {}", args.file.display()))?;
            emit(&AggregateReport::new(&result, args.functions), format)
        }
        Command::Relationships(args) => {
            let options = RelationshipOptions {
                min_coverage: args.min_coverage,
                verbose: args.verbose,
            };
            let report = global
                .builder(args.left.clone(), None)
                .relationships(args.right.clone(), options)
                .await
                .with_context(|| {
                    format!(
                        "relationships between {} and {}",
                        args.left.display(),
                        args.right.display()
                    )
                })?;
            emit(&report, format)
        }
        Command::Join(args) => {
            let mut options = JoinOptions::new().with_select(args.select);
            options.left_key = args.left_key;
            options.right_key = args.right_key;
            if let Some(limit) = args.limit {
                options = options.with_limit(limit);
            }
            let result = global
                .builder(args.left.clone(), Some(&args.filter))
                .join(args.right.clone(), options)
                .await
                .with_context(|| format!("joining {} with {}", args.left.display(), args.right.display()))?;
            emit(&result, format)
        }
        Command::Lookup(args) => lookup(&global, args).await,
    }
}

async fn lookup(global: &GlobalArgs, args: LookupArgs) -> Result<()> {
    let mut names = args.type_names;
    if let Some(file) = &args.from {
        let types = global
            .builder(file.clone(), None)
            .group_by("payload.$type")
            .await
            .with_context(|| format!("collecting types from {}", file.display()))?;
        for key in types.groups.keys() {
            if key == MISSING_KEY || key == NULL_KEY {
                continue;
            }
            let name = type_name(key);
            if !names.iter().any(|known| known == name) {
                names.push(name.to_string());
            }
        }
    }
    if names.is_empty() {
        anyhow::bail!("no type names given; pass names or --from <file>");
    }

    let config = LookupConfig::new(args.program.clone())
        .with_args(args.args)
        .with_request_timeout(Duration::from_millis(args.timeout_ms));
    let mut process =
        ProcessTypeLookup::spawn(&config).with_context(|| format!("starting {}", args.program))?;
    let outcomes = lookup_all(&mut process, &names).await;
    process.close().await.context("closing the lookup process")?;
    emit(&outcomes.context("type lookup")?, global.format)
}
