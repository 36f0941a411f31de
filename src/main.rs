use anyhow::{bail, Context, Result};
use catex::cli::{
    Cli, Command, GenerateArgs, OutputFormat, RepeatedArgs, TrendArgs, WearSummaryArgs,
};
use catex::config::CatexConfig;
use catex::report::ExceptionReport;
use catex::survey::{Category, SurveyContext};
use catex::threshold::ThresholdSet;
use catex::trend::{HistoricalSurvey, PriorReport, TrendHistory};
use catex::{csv_output, input, json_output, matcher, text_output, trend, wear_summary};
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces trace level
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CatexConfig> {
    match path {
        Some(path) => CatexConfig::from_file(path),
        None => Ok(CatexConfig::default()),
    }
}

fn wear_table(report_dir: &Path) -> Result<PriorReport> {
    let path = report_dir.join(format!("{}.csv", Category::WireWear.file_stem()));
    Ok(PriorReport::new(input::read_exception_table(&path)?))
}

fn generate(args: GenerateArgs, config: &CatexConfig, format: OutputFormat) -> Result<()> {
    let datac = input::read_datac(&args.datac)?;
    let metadata = input::read_metadata(&args.metadata)?;
    let thresholds = ThresholdSet::from_file(&args.thresholds)?;

    let Some(line) = args.line.or(datac.line) else {
        bail!("no line code: pass --line or fill the DATAC LINE column");
    };
    let Some(track) = args.track.or(datac.track) else {
        bail!("no track: pass --track or fill the DATAC TRACK column");
    };
    let context = SurveyContext::new(datac.date, line, args.section, track);
    info!(date = %context.date, line = %context.line, section = %context.section, track = %context.track, "generating exception report");

    let report = ExceptionReport::generate(&datac.readings, &metadata, &thresholds, context, config)?;

    if let Some(dir) = &args.output {
        csv_output::write_report_dir(&report, dir)?;
    }
    match format {
        OutputFormat::Text => print!("{}", text_output::report_text(&report)),
        OutputFormat::Json => println!("{}", json_output::report_json(&report)?),
        OutputFormat::Csv => csv_output::write_report(io::stdout().lock(), &report)?,
    }
    Ok(())
}

fn repeated(args: RepeatedArgs, format: OutputFormat) -> Result<()> {
    let reports = args
        .reports
        .iter()
        .map(|dir| {
            input::read_report_dir(dir).with_context(|| format!("failed to load report {}", dir.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = matcher::summarize(&reports)?;

    if let Some(dir) = &args.output {
        csv_output::write_repeat_dir(&summary, dir)?;
    }
    match format {
        OutputFormat::Text => print!("{}", text_output::repeat_text(&summary)),
        OutputFormat::Json => println!("{}", json_output::repeat_json(&summary)?),
        OutputFormat::Csv => csv_output::write_summary(io::stdout().lock(), &summary)?,
    }
    Ok(())
}

fn review_trend(args: TrendArgs, config: &CatexConfig, format: OutputFormat) -> Result<()> {
    if args.older_reports.len() != args.older_catenary.len() {
        bail!(
            "--older-report and --older-catenary must pair up ({} vs {})",
            args.older_reports.len(),
            args.older_catenary.len()
        );
    }

    let summary = input::read_summary(&args.summary)?;
    let previous = input::read_previous(&args.previous)?;
    let nearest = wear_table(&args.nearest)?;
    let second = wear_table(&args.second)?;
    let older = args
        .older_reports
        .iter()
        .zip(&args.older_catenary)
        .map(|(dir, catenary)| {
            let context = input::read_survey_context(dir)
                .with_context(|| format!("failed to date older report {}", dir.display()))?;
            Ok(HistoricalSurvey::new(
                context.date,
                wear_table(dir)?,
                input::read_catenary(catenary)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let history = TrendHistory {
        nearest: &nearest,
        second: &second,
        older: &older,
    };
    let table = trend::analyze(&summary, &previous, history, &config.trend)?;

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        csv_output::write_trend(file, &table)?;
    }
    match format {
        OutputFormat::Text => print!("{}", text_output::trend_text(&table)),
        OutputFormat::Json => println!("{}", json_output::trend_json(&table)?),
        OutputFormat::Csv => csv_output::write_trend(io::stdout().lock(), &table)?,
    }
    Ok(())
}

fn wear(args: WearSummaryArgs, format: OutputFormat) -> Result<()> {
    let readings = input::read_catenary(&args.catenary)?;
    let ranges: Vec<_> = input::read_spans(&args.spans)?
        .into_iter()
        .filter_map(|span| {
            let label = span.value.tension_length?;
            Some(catex::metadata::Range {
                from: span.from,
                to: span.to,
                value: label,
            })
        })
        .collect();

    let stats = wear_summary::summarize_wear(&readings, &ranges);
    match format {
        OutputFormat::Text => print!("{}", text_output::wear_text(&stats)),
        OutputFormat::Json => println!("{}", json_output::wear_json(&stats)?),
        OutputFormat::Csv => csv_output::write_wear_summary(io::stdout().lock(), &stats)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Generate(cmd) => generate(cmd, &config, args.format),
        Command::Repeated(cmd) => repeated(cmd, args.format),
        Command::Trend(cmd) => review_trend(cmd, &config, args.format),
        Command::WearSummary(cmd) => wear(cmd, args.format),
    }
}
