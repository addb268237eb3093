use popyramid::geom::point;
use popyramid::render::raster::{self, RasterError, RasterOptions};
use popyramid::render::{
    HeadlessError, LayoutOptions, SvgRenderOptions, layout_dataset_sync, render_layout_svg,
    sanitize_svg_id, settled_hover,
};
use popyramid::{Dataset, LayoutConfig};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Load(popyramid::Error),
    Render(HeadlessError),
    Raster(RasterError),
    Json(serde_json::Error),
    NoBarHovered,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Load(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoBarHovered => write!(f, "No bar under the --hover point"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<popyramid::Error> for CliError {
    fn from(value: popyramid::Error) -> Self {
        Self::Load(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Layout,
    #[default]
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum Preset {
    #[default]
    Interactive,
    Static,
}

impl FromStr for Preset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interactive" => Ok(Self::Interactive),
            "static" => Ok(Self::Static),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

impl RenderFormat {
    fn extension(self) -> &'static str {
        match self {
            RenderFormat::Svg => "svg",
            RenderFormat::Png => "png",
            RenderFormat::Jpeg => "jpg",
            RenderFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    preset: Preset,
    config: Option<String>,
    overrides: Vec<(String, Value)>,
    interactive: bool,
    placeholder: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    hover: Option<(f64, f64)>,
    diagram_id: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "popyramid-cli\n\
\n\
USAGE:\n\
  popyramid-cli layout [--pretty] [--preset interactive|static] [--config <json>] [--set <key>=<value>]... [--interactive] [<csv>|-]\n\
  popyramid-cli [render] [--format svg|png|jpg|pdf] [--scale <n>] [--background <css-color>] [--preset interactive|static] [--config <json>] [--set <key>=<value>]... [--interactive] [--placeholder] [--hover <x>,<y>] [--id <chart-id>] [--out <path>] [<csv>|-]\n\
\n\
NOTES:\n\
  - If <csv> is omitted or '-', input is read from stdin.\n\
  - The CSV needs Age, Males and Females columns; rows are drawn bottom to top.\n\
  - --config overlays a JSON object (camelCase keys) onto the preset; --set overlays one dotted key.\n\
  - --placeholder renders the empty chart frame (with a warning) when the input cannot be loaded.\n\
  - --hover draws the tooltip of the bar under SVG canvas coordinates <x>,<y> after it has faded in.\n\
  - layout prints the computed marks as JSON.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG/PDF output defaults to writing next to the input file (or ./out.<ext> for stdin).\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n\
"
}

fn parse_hover(raw: &str) -> Option<(f64, f64)> {
    let (x, y) = raw.split_once(',')?;
    let x = x.trim().parse::<f64>().ok()?;
    let y = y.trim().parse::<f64>().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn parse_override(raw: &str) -> Option<(String, Value)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    // Bare words become strings so `--set maleColor=teal` works without JSON quoting.
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Some((key.to_string(), value))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--interactive" => args.interactive = true,
            "--placeholder" => args.placeholder = true,
            "--preset" => {
                let Some(preset) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.preset = preset
                    .parse::<Preset>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--set" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let entry = parse_override(raw).ok_or(CliError::Usage(usage()))?;
                args.overrides.push(entry);
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--hover" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.hover = Some(parse_hover(raw).ok_or(CliError::Usage(usage()))?);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn build_config(args: &Args) -> Result<LayoutConfig, CliError> {
    let mut config = match args.preset {
        Preset::Interactive => LayoutConfig::interactive_preset(),
        Preset::Static => LayoutConfig::static_preset(),
    };
    if let Some(path) = args.config.as_deref() {
        let text = std::fs::read_to_string(path)?;
        let overrides: Value = serde_json::from_str(&text)?;
        config = config.merged_with(&overrides)?;
    }
    for (key, value) in &args.overrides {
        config = config.with_value(key, value.clone())?;
    }
    if args.interactive {
        config.interactive = true;
    }
    config.validate()?;
    Ok(config)
}

fn load_input(input: Option<&str>) -> Result<Dataset, CliError> {
    match input {
        None | Some("-") => Ok(popyramid::read_dataset("<stdin>", std::io::stdin().lock())?),
        Some(path) => Ok(popyramid::load_dataset(path)?),
    }
}

// Load failures fall back to the empty frame only when asked to.
fn load_or_placeholder(input: Option<&str>, placeholder: bool) -> Result<Dataset, CliError> {
    match load_input(input) {
        Err(CliError::Load(err)) if placeholder => {
            let source = input.unwrap_or("<stdin>");
            tracing::warn!(
                source,
                error = %err,
                "failed to load pyramid data; rendering empty chart"
            );
            Ok(Dataset::empty(source))
        }
        other => other,
    }
}

fn write_json(value: &impl serde::Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(ext),
        _ => PathBuf::from(format!("out.{ext}")),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let placeholder = matches!(args.command, Command::Render) && args.placeholder;
    let dataset = load_or_placeholder(args.input.as_deref(), placeholder)?;
    tracing::debug!(
        command = ?args.command,
        source = %dataset.source,
        rows = dataset.len(),
        interactive = config.interactive,
        "input loaded"
    );

    let options = LayoutOptions::default().with_config(config);
    let layout = layout_dataset_sync(&dataset, &options)?;

    if let Command::Layout = args.command {
        return write_json(&layout, args.pretty);
    }

    let tooltip = match args.hover {
        Some((x, y)) => Some(settled_hover(&layout, point(x, y)).ok_or(CliError::NoBarHovered)?),
        None => None,
    };
    let format = args.render_format;
    let svg_options = SvgRenderOptions {
        diagram_id: args.diagram_id.as_deref().map(sanitize_svg_id),
        tooltip,
        // Raster formats fill the pixmap instead of drawing a rect.
        background: match format {
            RenderFormat::Svg => args.background.clone(),
            _ => None,
        },
    };
    let svg = render_layout_svg(&layout, options.text_measurer.as_ref(), &svg_options)?;

    let raster_options = RasterOptions {
        scale: args.render_scale,
        background: args.background.clone(),
        ..Default::default()
    };
    let bytes = match format {
        RenderFormat::Svg => return write_text(&svg, args.out.as_deref()),
        RenderFormat::Png => raster::svg_to_png(&svg, &raster_options)?,
        RenderFormat::Jpeg => raster::svg_to_jpeg(&svg, &raster_options)?,
        RenderFormat::Pdf => raster::svg_to_pdf(&svg)?,
    };

    let out = args.out.map(PathBuf::from).unwrap_or_else(|| {
        default_raster_out_path(args.input.as_deref(), format.extension())
    });
    std::fs::write(&out, bytes)?;
    tracing::debug!(path = %out.display(), "raster written");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoBarHovered) => {
            eprintln!("{}", CliError::NoBarHovered);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
