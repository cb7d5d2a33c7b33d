use clap::{Parser, Subcommand};
use sc_image::attrs::{collect_element_attrs, override_attrs};
use sc_image::config::{self, RenderConfig};
use sc_image::directive::{RenderOutcome, render_once, select_outcome};
use sc_image::dom::Document;
use sc_image::field::{self, ImageField, ParamValue};
use sc_image::media::JssMedia;
use sc_image::output;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that evaluate a field.
#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Field JSON file, or `-` for stdin
    field: PathBuf,

    /// Config file; repeat to layer, later files override earlier ones
    #[arg(long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,

    /// Ignore editing markup and metadata
    #[arg(long)]
    no_editable: bool,

    /// Rendering parameter added to image URLs (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Attribute overriding the field's own (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    attrs: Vec<(String, String)>,
}

#[derive(Parser)]
#[command(name = "sc-image")]
#[command(about = "Resolve and render CMS image fields")]
#[command(long_about = "\
Resolve and render CMS image fields

A field is JSON in one of three shapes:

  {\"value\": {\"src\": \"/-/media/dawn.jpg\", \"alt\": \"Dawn\"}}
  {\"src\": \"/-/media/dawn.jpg\", \"srcSet\": [{\"mw\": 300}, {\"mw\": 100}]}
  {\"editable\": \"<img src=\\\"/-/media/dawn.jpg\\\" />\", \"value\": {...}}

Render mode (first match wins):
  Empty:      no field, or edit mode with nothing to show
  Inline:     edit mode and the field carries editing markup
  Templated:  the value resolves to a usable src

Run 'sc-image gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Log render decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a field to HTML on stdout
    Render {
        #[command(flatten)]
        args: RenderArgs,

        /// Describe the chosen render mode on stderr
        #[arg(long)]
        explain: bool,
    },
    /// Print the resolved attributes of a field as JSON
    Resolve(RenderArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render { args, explain } => {
            let config = effective_config(&args)?;
            let field = read_field(&args.field)?;
            let with_metadata = config.editable && field.metadata.is_some();
            let inputs = config.image_inputs(field)?;
            let (outcome, html) = render_once(
                inputs,
                Box::new(config.template()),
                &JssMedia,
                &config.wrapper_class,
            );
            if explain {
                output::print_outcome(
                    outcome.as_ref(),
                    &config.template.tag,
                    &config.wrapper_class,
                    with_metadata,
                );
            }
            println!("{}", html);
        }
        Command::Resolve(args) => {
            let config = effective_config(&args)?;
            let field = read_field(&args.field)?;
            let inputs = config.image_inputs(field)?;

            let mut scratch = Document::new();
            let element_attrs = collect_element_attrs(&config.template(), &mut scratch);
            let overrides = override_attrs(&element_attrs, &inputs.attrs);

            let json = match select_outcome(&inputs, &overrides, &JssMedia) {
                Some(RenderOutcome::TemplatedImage(attrs)) => serde_json::to_value(attrs)?,
                Some(RenderOutcome::InlineMarkup(markup)) => serde_json::json!({ "editable": markup }),
                Some(RenderOutcome::Empty) | None => serde_json::Value::Null,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "sc_image=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config files, then command-line flags on top.
fn effective_config(args: &RenderArgs) -> Result<RenderConfig, config::ConfigError> {
    let mut config = config::load_config(args.configs.as_slice())?;
    if args.no_editable {
        config.editable = false;
    }
    for (key, value) in &args.params {
        config.url_params.insert(key.clone(), param_value(value));
    }
    for (key, value) in &args.attrs {
        config
            .attrs
            .insert(key.clone(), serde_json::Value::String(value.clone()));
    }
    config.validate()?;
    Ok(config)
}

fn read_field(path: &Path) -> Result<ImageField, field::FieldError> {
    if path == Path::new("-") {
        let mut json = String::new();
        std::io::stdin().read_to_string(&mut json)?;
        field::parse_field(&json)
    } else {
        field::load_field(path)
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

/// Numbers stay numbers so `w=100` reads the same as in a config file.
fn param_value(raw: &str) -> ParamValue {
    if let Ok(int) = raw.parse::<i64>() {
        ParamValue::Int(int)
    } else if let Some(float) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        ParamValue::Float(float)
    } else {
        ParamValue::from(raw)
    }
}
