//! rawdev - command-line RAW developer.
//!
//! Long flags map 1:1 onto the parameter record; a JSON preset can seed
//! the record and explicit flags override it. The only container this
//! binary decodes itself is the 16-bit grayscale "raw PNG" mosaic; real
//! RAW containers are decoded by a collaborating host that hands the
//! library the decoded plane.
//!
//! Exit codes: 0 success, 1 argument error, 2 decode error, 3 run error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rawdev_core::Rgb8Layout;
use rawdev_math::CurvePoint;
use rawdev_ops::DemosaicAlgorithm;
use rawdev_pipeline::{CurveMode, DenoiseMethod, ProcessParams, WheelParams};

mod plot;

#[derive(Parser, Debug)]
#[command(name = "rawdev")]
#[command(version, about = "Develop a RAW mosaic into an 8-bit RGB image")]
#[command(long_about = "
Develops a Bayer mosaic (16-bit grayscale PNG, black=25/white=1023) into a
finished 8-bit PNG through the full processing pipeline.

Examples:
  rawdev --input mosaic.png --output out.png --exposure 0.5
  rawdev --input mosaic.png --output out.png --curve-points \"0:0,0.5:0.4,1:1\"
  rawdev --input mosaic.png --output out.png --preset look.json --tint 0.1
")]
struct Cli {
    /// Input raw mosaic (16-bit grayscale PNG).
    #[arg(long)]
    input: PathBuf,

    /// Output 8-bit PNG.
    #[arg(long)]
    output: PathBuf,

    /// JSON preset seeding the parameter record.
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Write the effective parameter record as JSON and continue.
    #[arg(long)]
    save_preset: Option<PathBuf>,

    /// Also render a plot of the active tone curve next to the output.
    #[arg(long)]
    curve_plot: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    // Pipeline options.
    /// Demosaic algorithm: fast, ahd, lmmse or ri.
    #[arg(long)]
    demosaic: Option<String>,
    /// Exposure compensation in stops.
    #[arg(long)]
    exposure: Option<f32>,
    /// Color temperature in Kelvin.
    #[arg(long)]
    color_temp: Option<f32>,
    /// Green/magenta tint; >0 toward magenta.
    #[arg(long)]
    tint: Option<f32>,
    /// Gr/Gb response balance.
    #[arg(long)]
    green_balance: Option<f32>,
    /// Automatic CA correction strength; 0 disables.
    #[arg(long)]
    ca_strength: Option<f32>,
    /// Manual red/cyan lateral CA.
    #[arg(long)]
    ca_red_cyan: Option<f32>,
    /// Manual blue/yellow lateral CA.
    #[arg(long)]
    ca_blue_yellow: Option<f32>,
    /// Denoise kernel: guided or nlmeans.
    #[arg(long)]
    denoise_method: Option<String>,
    /// Denoise strength, 0-100.
    #[arg(long)]
    denoise_strength: Option<f32>,
    /// Denoise filter epsilon.
    #[arg(long)]
    denoise_eps: Option<f32>,
    /// Dehaze strength, 0-100.
    #[arg(long)]
    dehaze: Option<f32>,
    /// Disable hot-pixel suppression.
    #[arg(long)]
    no_hot_pixel: bool,

    // Local adjustments.
    /// Local detail enhancement, -100..100.
    #[arg(long)]
    ll_detail: Option<f32>,
    /// Local clarity, -100..100.
    #[arg(long)]
    ll_clarity: Option<f32>,
    /// Shadow recovery, -100..100.
    #[arg(long)]
    ll_shadows: Option<f32>,
    /// Highlight recovery, -100..100.
    #[arg(long)]
    ll_highlights: Option<f32>,
    /// Black point, -100..100.
    #[arg(long)]
    ll_blacks: Option<f32>,
    /// White point, -100..100.
    #[arg(long)]
    ll_whites: Option<f32>,

    // Tone mapping.
    /// Display gamma.
    #[arg(long)]
    gamma: Option<f32>,
    /// Default S-curve contrast.
    #[arg(long)]
    contrast: Option<f32>,
    /// Curve mode: luma or rgb.
    #[arg(long)]
    curve_mode: Option<String>,
    /// Luma curve points, e.g. "0:0,0.5:0.4,1:1".
    #[arg(long)]
    curve_points: Option<String>,
    /// Red channel curve points.
    #[arg(long)]
    curve_r: Option<String>,
    /// Green channel curve points.
    #[arg(long)]
    curve_g: Option<String>,
    /// Blue channel curve points.
    #[arg(long)]
    curve_b: Option<String>,

    // Color grading.
    /// Shadow wheel offset, "x,y".
    #[arg(long)]
    shadows_wheel: Option<String>,
    /// Shadow luminance trim.
    #[arg(long)]
    shadows_luma: Option<f32>,
    /// Midtone wheel offset, "x,y".
    #[arg(long)]
    midtones_wheel: Option<String>,
    /// Midtone luminance trim.
    #[arg(long)]
    midtones_luma: Option<f32>,
    /// Highlight wheel offset, "x,y".
    #[arg(long)]
    highlights_wheel: Option<String>,
    /// Highlight luminance trim.
    #[arg(long)]
    highlights_luma: Option<f32>,
    /// Hue-vs-hue curve points.
    #[arg(long)]
    h_vs_h: Option<String>,
    /// Hue-vs-saturation curve points.
    #[arg(long)]
    h_vs_s: Option<String>,
    /// Hue-vs-luma curve points.
    #[arg(long)]
    h_vs_l: Option<String>,
    /// Luma-vs-saturation curve points.
    #[arg(long)]
    l_vs_s: Option<String>,
    /// Saturation-vs-saturation curve points.
    #[arg(long)]
    s_vs_s: Option<String>,
    /// Global saturation multiplier.
    #[arg(long)]
    saturation: Option<f32>,

    // Vignette.
    /// Vignette strength, -100..100.
    #[arg(long)]
    vignette_amount: Option<f32>,
    /// Vignette feather/reach, 0..100.
    #[arg(long)]
    vignette_midpoint: Option<f32>,
    /// Vignette shape, 0 circular to 100 elliptical.
    #[arg(long)]
    vignette_roundness: Option<f32>,
    /// Vignette highlight protection, 0..100.
    #[arg(long)]
    vignette_highlights: Option<f32>,

    // Lens correction.
    /// Manual distortion k1.
    #[arg(long)]
    dist_k1: Option<f32>,
    /// Manual distortion k2.
    #[arg(long)]
    dist_k2: Option<f32>,
    /// Manual distortion k3.
    #[arg(long)]
    dist_k3: Option<f32>,

    // Geometry.
    /// Rotation in degrees.
    #[arg(long)]
    rotate: Option<f32>,
    /// Scale in percent.
    #[arg(long)]
    scale: Option<f32>,
    /// Aspect multiplier.
    #[arg(long)]
    aspect: Option<f32>,
    /// Vertical keystone, -100..100.
    #[arg(long)]
    keystone_v: Option<f32>,
    /// Horizontal keystone, -100..100.
    #[arg(long)]
    keystone_h: Option<f32>,
    /// Horizontal offset in pixels.
    #[arg(long)]
    offset_x: Option<f32>,
    /// Vertical offset in pixels.
    #[arg(long)]
    offset_y: Option<f32>,
    /// Downscale the output by this factor (1 = full size).
    #[arg(long)]
    downscale: Option<f32>,
}

/// Parses a curve string like "0:0,0.5:0.6,1:1".
fn parse_curve(s: &str) -> anyhow::Result<Vec<CurvePoint>> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (x, y) = part
                .trim()
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("curve point '{part}' is not x:y"))?;
            Ok(CurvePoint::new(x.trim().parse()?, y.trim().parse()?))
        })
        .collect()
}

/// Parses a wheel offset like "0.1,-0.05".
fn parse_wheel(s: &str) -> anyhow::Result<(f32, f32)> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("wheel offset '{s}' is not x,y"))?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}

/// Applies explicitly given flags on top of the base parameter record.
fn build_params(cli: &Cli) -> anyhow::Result<ProcessParams> {
    let mut p = match &cli.preset {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => ProcessParams::default(),
    };

    if let Some(v) = &cli.demosaic {
        p.demosaic = DemosaicAlgorithm::parse(v);
    }
    if let Some(v) = cli.exposure {
        p.exposure = v;
    }
    if let Some(v) = cli.color_temp {
        p.color_temp = v;
    }
    if let Some(v) = cli.tint {
        p.tint = v;
    }
    if let Some(v) = cli.green_balance {
        p.green_balance = v;
    }
    if let Some(v) = cli.ca_strength {
        p.ca_strength = v;
    }
    if let Some(v) = cli.ca_red_cyan {
        p.ca_red_cyan = v;
    }
    if let Some(v) = cli.ca_blue_yellow {
        p.ca_blue_yellow = v;
    }
    if let Some(v) = &cli.denoise_method {
        p.denoise_method = match v.to_lowercase().as_str() {
            "guided" => DenoiseMethod::Guided,
            "nlmeans" => DenoiseMethod::Nlmeans,
            other => anyhow::bail!("unknown denoise method '{other}'"),
        };
    }
    if let Some(v) = cli.denoise_strength {
        p.denoise_strength = v;
    }
    if let Some(v) = cli.denoise_eps {
        p.denoise_eps = v;
    }
    if let Some(v) = cli.dehaze {
        p.dehaze_strength = v;
    }
    if cli.no_hot_pixel {
        p.hot_pixel_suppression = false;
    }
    if let Some(v) = cli.ll_detail {
        p.ll_detail = v;
    }
    if let Some(v) = cli.ll_clarity {
        p.ll_clarity = v;
    }
    if let Some(v) = cli.ll_shadows {
        p.ll_shadows = v;
    }
    if let Some(v) = cli.ll_highlights {
        p.ll_highlights = v;
    }
    if let Some(v) = cli.ll_blacks {
        p.ll_blacks = v;
    }
    if let Some(v) = cli.ll_whites {
        p.ll_whites = v;
    }
    if let Some(v) = cli.gamma {
        p.gamma = v;
    }
    if let Some(v) = cli.contrast {
        p.contrast = v;
    }
    if let Some(v) = &cli.curve_mode {
        p.curve_mode = match v.to_lowercase().as_str() {
            "luma" => CurveMode::Luma,
            "rgb" => CurveMode::Rgb,
            other => anyhow::bail!("unknown curve mode '{other}'"),
        };
    }
    if let Some(v) = &cli.curve_points {
        p.curve_luma = parse_curve(v)?;
    }
    if let Some(v) = &cli.curve_r {
        p.curve_r = parse_curve(v)?;
    }
    if let Some(v) = &cli.curve_g {
        p.curve_g = parse_curve(v)?;
    }
    if let Some(v) = &cli.curve_b {
        p.curve_b = parse_curve(v)?;
    }

    let apply_wheel =
        |text: &Option<String>, luma: Option<f32>, wheel: &mut WheelParams| -> anyhow::Result<()> {
            if let Some(s) = text {
                let (x, y) = parse_wheel(s)?;
                wheel.x = x;
                wheel.y = y;
            }
            if let Some(l) = luma {
                wheel.luma = l;
            }
            Ok(())
        };
    apply_wheel(&cli.shadows_wheel, cli.shadows_luma, &mut p.shadows_wheel)?;
    apply_wheel(&cli.midtones_wheel, cli.midtones_luma, &mut p.midtones_wheel)?;
    apply_wheel(
        &cli.highlights_wheel,
        cli.highlights_luma,
        &mut p.highlights_wheel,
    )?;

    if let Some(v) = &cli.h_vs_h {
        p.hue_vs_hue = parse_curve(v)?;
    }
    if let Some(v) = &cli.h_vs_s {
        p.hue_vs_sat = parse_curve(v)?;
    }
    if let Some(v) = &cli.h_vs_l {
        p.hue_vs_lum = parse_curve(v)?;
    }
    if let Some(v) = &cli.l_vs_s {
        p.lum_vs_sat = parse_curve(v)?;
    }
    if let Some(v) = &cli.s_vs_s {
        p.sat_vs_sat = parse_curve(v)?;
    }
    if let Some(v) = cli.saturation {
        p.saturation = v;
    }
    if let Some(v) = cli.vignette_amount {
        p.vignette_amount = v;
    }
    if let Some(v) = cli.vignette_midpoint {
        p.vignette_midpoint = v;
    }
    if let Some(v) = cli.vignette_roundness {
        p.vignette_roundness = v;
    }
    if let Some(v) = cli.vignette_highlights {
        p.vignette_highlights = v;
    }
    if let Some(v) = cli.dist_k1 {
        p.dist_k1 = v;
    }
    if let Some(v) = cli.dist_k2 {
        p.dist_k2 = v;
    }
    if let Some(v) = cli.dist_k3 {
        p.dist_k3 = v;
    }
    if let Some(v) = cli.rotate {
        p.rotate = v;
    }
    if let Some(v) = cli.scale {
        p.scale = v;
    }
    if let Some(v) = cli.aspect {
        p.aspect = v;
    }
    if let Some(v) = cli.keystone_v {
        p.keystone_v = v;
    }
    if let Some(v) = cli.keystone_h {
        p.keystone_h = v;
    }
    if let Some(v) = cli.offset_x {
        p.offset_x = v;
    }
    if let Some(v) = cli.offset_y {
        p.offset_y = v;
    }
    if let Some(v) = cli.downscale {
        p.downscale = v;
    }

    Ok(p)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "rawdev=info",
        2 => "rawdev=debug",
        _ => "rawdev=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version are not argument errors.
            if e.use_stderr() {
                eprintln!("{e}");
                return ExitCode::from(1);
            }
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    init_tracing(cli.verbose);

    let params = match build_params(&cli) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("argument error: {e}");
            return ExitCode::from(1);
        }
    };

    let gains = rawdev_color::kelvin_to_rgb_gains(params.color_temp, params.tint);
    tracing::debug!(
        temp = params.color_temp,
        r = gains.r,
        b = gains.b,
        "white balance gains"
    );

    if let Some(path) = &cli.save_preset {
        match serde_json::to_string_pretty(&params) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    eprintln!("argument error: cannot write preset: {e}");
                    return ExitCode::from(1);
                }
            }
            Err(e) => {
                eprintln!("argument error: cannot serialize preset: {e}");
                return ExitCode::from(1);
            }
        }
    }

    let raw = match rawdev_io::load_raw_png(&cli.input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("decode error: {e}");
            return ExitCode::from(2);
        }
    };
    tracing::info!(
        input = %cli.input.display(),
        width = raw.dimensions().0,
        height = raw.dimensions().1,
        "loaded mosaic"
    );

    let output = match rawdev_pipeline::run(&params, &raw, Rgb8Layout::Interleaved) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("run error: {e}");
            return ExitCode::from(3);
        }
    };
    for warning in &output.warnings {
        tracing::warn!("{warning}");
    }

    if let Err(e) = rawdev_io::write_png8(&cli.output, &output.image) {
        eprintln!("run error: cannot write output: {e}");
        return ExitCode::from(3);
    }
    tracing::info!(output = %cli.output.display(), "wrote image");

    if cli.curve_plot {
        let plot_path = cli.output.with_extension("curve.png");
        match plot::render_curve_plot(&params) {
            Ok(buf) => {
                if let Err(e) = rawdev_io::write_png8(&plot_path, &buf) {
                    eprintln!("run error: cannot write curve plot: {e}");
                    return ExitCode::from(3);
                }
                tracing::info!(plot = %plot_path.display(), "wrote curve plot");
            }
            Err(e) => {
                eprintln!("run error: {e}");
                return ExitCode::from(3);
            }
        }
    }

    ExitCode::SUCCESS
}
