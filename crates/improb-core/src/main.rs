//! improb: imprecise probability engine.
//!
//! Every command prints one JSON document on stdout. Logs and error reports
//! go to stderr; the exit code says how the run ended.

use clap::{Args, Parser, Subcommand};
use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace, StructuredError};
use improb_config::{load_config, EngineConfig, PresetName, ValidationError};
use improb_core::decision::{
    Criterion, GammaMaximax, GammaMaximin, Hurwicz, IntervalDominance, LowPrevMaximality, Optimality,
    PointwiseDominance,
};
use improb_core::exit_codes::ExitCode;
use improb_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use improb_core::lowprev::{Algorithm, LowPrev, LowProb};
use improb_core::model::{Model, ModelError, ModelFile};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{debug, info_span};

/// Lower previsions, natural extension and decisions under imprecision
#[derive(Parser)]
#[command(name = "improb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named preset: exact or fast
    #[arg(long, global = true)]
    preset: Option<PresetName>,

    /// Override the number kind: fraction or float
    #[arg(long, global = true)]
    kind: Option<NumberKind>,

    /// trace, debug, info, warn, error or off
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// human or jsonl
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower prevision of a gamble
    Lower(QueryArgs),

    /// Upper prevision of a gamble
    Upper(QueryArgs),

    /// Report sure loss, coherence and linearity of a model
    Check(ModelArgs),

    /// Extreme points of a model's credal set
    CredalSet(ModelArgs),

    /// Extreme k-monotone lower probabilities on a space of a given size
    Extreme(ExtremeArgs),

    /// Optimal gambles under a decision criterion
    Maximal(MaximalArgs),
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Model file (JSON)
    model: PathBuf,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Model file (JSON)
    model: PathBuf,

    /// Gamble values in outcome order, comma separated (e.g. 1,0,1/2)
    #[arg(long, allow_hyphen_values = true)]
    gamble: String,

    /// Conditioning event, comma separated outcome labels
    #[arg(long)]
    event: Option<String>,

    /// natural, choquet or linvac
    #[arg(long, default_value = "natural")]
    algorithm: Algorithm,
}

#[derive(Args, Debug)]
struct ExtremeArgs {
    /// Number of outcomes (labelled 0..size)
    #[arg(long)]
    size: usize,

    #[arg(long, default_value_t = 2)]
    monotonicity: usize,
}

#[derive(Args, Debug)]
struct MaximalArgs {
    /// Model file (JSON)
    model: PathBuf,

    /// Candidate gamble; repeat for each candidate
    #[arg(long = "gamble", required = true, allow_hyphen_values = true)]
    gambles: Vec<String>,

    /// Conditioning event, comma separated outcome labels
    #[arg(long)]
    event: Option<String>,

    #[arg(long, default_value = "maximality")]
    criterion: Criterion,

    /// Optimism index for the Hurwicz criterion
    #[arg(long)]
    alpha: Option<String>,
}

#[derive(ThisError, Debug)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Engine(#[from] Error),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_) => ExitCode::ConfigError,
            CliError::Model(ModelError::Engine(e)) | CliError::Engine(e) => ExitCode::for_error(e),
            CliError::Model(_) | CliError::Usage(_) => ExitCode::InputError,
        }
    }

    fn to_json(&self) -> Value {
        let exit_code = self.exit_code();
        let detail = match self {
            CliError::Model(ModelError::Engine(e)) | CliError::Engine(e) => {
                serde_json::to_value(StructuredError::from(e)).unwrap_or(Value::Null)
            }
            CliError::Config(e) => json!({ "code": e.code(), "message": e.to_string() }),
            other => json!({ "message": other.to_string() }),
        };
        json!({
            "status": "error",
            "exit_code": exit_code.as_i32(),
            "code_name": exit_code.code_name(),
            "error": detail,
        })
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env(cli.global.log_level, cli.global.log_format));

    let run_id = generate_run_id();
    let span = info_span!("improb", run_id = %run_id);
    let _guard = span.enter();

    let result = match &cli.command {
        Commands::Lower(args) => run_query(&cli.global, args, false),
        Commands::Upper(args) => run_query(&cli.global, args, true),
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::CredalSet(args) => run_credal_set(&cli.global, args),
        Commands::Extreme(args) => run_extreme(&cli.global, args),
        Commands::Maximal(args) => run_maximal(&cli.global, args),
    };

    let exit_code = match result {
        Ok(payload) => {
            print_json(&cli.global, &payload, false);
            ExitCode::Ok
        }
        Err(error) => {
            print_json(&cli.global, &error.to_json(), true);
            error.exit_code()
        }
    };
    debug!(exit_code = %exit_code, "done");
    exit_code.into()
}

fn print_json(global: &GlobalOpts, value: &Value, to_stderr: bool) {
    let text = if global.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    let text = text.unwrap_or_else(|e| format!(r#"{{"status":"error","error":{{"message":"{}"}}}}"#, e));
    if to_stderr {
        eprintln!("{}", text);
    } else {
        println!("{}", text);
    }
}

fn engine_config(global: &GlobalOpts) -> CliResult<EngineConfig> {
    let loaded = load_config(global.config.as_deref(), global.preset)?;
    let mut config = loaded.config;
    if let Some(kind) = global.kind {
        config.number_kind = kind;
    }
    debug!(source = %loaded.source, kind = %config.number_kind, "configuration resolved");
    Ok(config)
}

/// Load a model; `--kind` beats the kind written in the file.
fn load_model(global: &GlobalOpts, path: &std::path::Path) -> CliResult<Model> {
    let config = engine_config(global)?;
    let mut file = ModelFile::from_path(path)?;
    if global.kind.is_some() {
        file.kind = Some(config.number_kind);
    }
    Ok(file.build(&config)?)
}

fn split_list(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn parse_gamble(space: &Arc<PossibilitySpace>, kind: NumberKind, text: &str) -> CliResult<Gamble> {
    Ok(Gamble::parse(space, kind, &split_list(text))?)
}

fn parse_event(space: &Arc<PossibilitySpace>, text: Option<&str>) -> CliResult<Option<Event>> {
    match text {
        Some(text) => Ok(Some(space.make_event(split_list(text))?)),
        None => Ok(None),
    }
}

fn number_json(value: &Number) -> Value {
    json!({ "value": value, "approx": value.to_f64() })
}

fn run_query(global: &GlobalOpts, args: &QueryArgs, upper: bool) -> CliResult<Value> {
    let mut model = load_model(global, &args.model)?;
    let space = Arc::clone(model.space());
    let gamble = parse_gamble(&space, model.kind(), &args.gamble)?;
    let event = parse_event(&space, args.event.as_deref())?;
    let value = if upper {
        model.get_upper_with(&gamble, event.as_ref(), args.algorithm)?
    } else {
        model.get_lower_with(&gamble, event.as_ref(), args.algorithm)?
    };
    Ok(json!({
        "status": "ok",
        "command": if upper { "upper" } else { "lower" },
        "algorithm": args.algorithm,
        "gamble": gamble.values(),
        "event": event.as_ref().map(|e| e.labels().collect::<Vec<_>>()),
        "result": number_json(&value),
    }))
}

fn run_check(global: &GlobalOpts, args: &ModelArgs) -> CliResult<Value> {
    let mut model = load_model(global, &args.model)?;
    let avoids_sure_loss = model.is_avoiding_sure_loss()?;
    let (coherent, linear) = if avoids_sure_loss {
        (Some(model.is_coherent()?), Some(model.is_linear()?))
    } else {
        (None, None)
    };
    let mut report = json!({
        "status": "ok",
        "command": "check",
        "model": model.model_type(),
        "kind": model.kind(),
        "outcomes": model.space().outcomes(),
        "assessments": model.as_lowpoly().len(),
        "avoids_sure_loss": avoids_sure_loss,
        "coherent": coherent,
        "linear": linear,
    });
    if let (Model::LowProb(lpr), true) = (&model, avoids_sure_loss) {
        // Judged on the natural extension to every event.
        let mut extended = lpr.clone();
        extended.extend()?;
        report["completely_monotone"] = json!(extended.is_completely_monotone()?);
    }
    Ok(report)
}

fn run_credal_set(global: &GlobalOpts, args: &ModelArgs) -> CliResult<Value> {
    let mut model = load_model(global, &args.model)?;
    let vertices = model.get_credal_set()?.collect::<improb_common::Result<Vec<_>>>()?;
    Ok(json!({
        "status": "ok",
        "command": "credal-set",
        "outcomes": model.space().outcomes(),
        "count": vertices.len(),
        "vertices": vertices,
    }))
}

fn run_extreme(global: &GlobalOpts, args: &ExtremeArgs) -> CliResult<Value> {
    let config = engine_config(global)?;
    let space = PossibilitySpace::range(args.size)?;
    let mut extremes = Vec::new();
    for lpr in LowProb::make_extreme_n_monotone(&space, args.monotonicity, config.vertex_enumeration_limit)? {
        let lpr = lpr?;
        let values: serde_json::Map<String, Value> = lpr
            .iter()
            .filter(|(event, _)| !event.is_empty())
            .map(|(event, value)| (event.to_string(), json!(value)))
            .collect();
        extremes.push(Value::Object(values));
    }
    Ok(json!({
        "status": "ok",
        "command": "extreme",
        "size": args.size,
        "monotonicity": args.monotonicity,
        "count": extremes.len(),
        "extremes": extremes,
    }))
}

fn run_maximal(global: &GlobalOpts, args: &MaximalArgs) -> CliResult<Value> {
    let model = load_model(global, &args.model)?;
    let space = Arc::clone(model.space());
    let kind = model.kind();
    let gambles = args
        .gambles
        .iter()
        .map(|text| parse_gamble(&space, kind, text))
        .collect::<CliResult<Vec<_>>>()?;
    let event = parse_event(&space, args.event.as_deref())?;
    if args.alpha.is_some() && args.criterion != Criterion::Hurwicz {
        return Err(CliError::Usage("--alpha only applies to the hurwicz criterion".into()));
    }

    let tolerance = model.tolerance();
    let mut operator: Box<dyn Optimality> = match args.criterion {
        Criterion::Pointwise => Box::new(PointwiseDominance::new(tolerance)),
        Criterion::Maximality => Box::new(LowPrevMaximality::new(model)),
        Criterion::Interval => Box::new(IntervalDominance::new(model)),
        Criterion::Maximin => Box::new(GammaMaximin::new(model)),
        Criterion::Maximax => Box::new(GammaMaximax::new(model)),
        Criterion::Hurwicz => {
            let alpha = args
                .alpha
                .as_deref()
                .ok_or_else(|| CliError::Usage("the hurwicz criterion needs --alpha".into()))?;
            let alpha = Number::parse(kind, alpha).map_err(Error::from)?;
            Box::new(Hurwicz::new(model, alpha)?)
        }
    };
    let maximal = operator.maximal(&gambles, event.as_ref())?;
    let indices: Vec<usize> = maximal
        .iter()
        .filter_map(|g| gambles.iter().position(|candidate| candidate == g))
        .collect();
    Ok(json!({
        "status": "ok",
        "command": "maximal",
        "criterion": args.criterion,
        "candidates": gambles.len(),
        "maximal": maximal.iter().map(|g| g.values()).collect::<Vec<_>>(),
        "indices": indices,
    }))
}
