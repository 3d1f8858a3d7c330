mod config;
mod logging;
mod ui;

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use color_probe_adapters::{
    present_health, present_outcome, present_sample, FsFileStore, HttpPredictionGateway,
    ImageCrateDecoder,
};
use color_probe_application::{
    AnalysisService, HealthQuery, LoadImageCommand, PickColorCommand, PollOutcomeCommand,
    StartAnalysisCommand,
};
use color_probe_domain::SessionEvent;
use config::AppConfig;

const OUTCOME_WAIT_MS: u64 = 35_000;

fn main() -> ExitCode {
    logging::init_logging();
    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_env();

    let command = parse_command(&args);
    match run_command(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            print_usage();
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_service(config: &AppConfig) -> Result<AnalysisService, CommandError> {
    let gateway = HttpPredictionGateway::new(&config.base_url)
        .map_err(|error| CommandError::Runtime(format!("failed to start gateway: {error}")))?;
    Ok(AnalysisService::new(
        Box::new(FsFileStore),
        Box::new(ImageCrateDecoder),
        Box::new(gateway),
    ))
}

#[derive(Debug, Clone)]
enum Command {
    Ui { image: Option<String> },
    Analyze {
        image: String,
        click_x: f32,
        click_y: f32,
        rendered: Option<(f32, f32)>,
    },
    Health,
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn parse_command(args: &[String]) -> Result<Command, CommandError> {
    if args.len() <= 1 {
        return Ok(Command::Ui { image: None });
    }

    match args[1].as_str() {
        "ui" => Ok(Command::Ui {
            image: args.get(2).cloned(),
        }),
        "analyze" => {
            if args.len() < 5 {
                return Err(CommandError::Usage(
                    "analyze needs an image path and a click position".to_string(),
                ));
            }
            let click_x = parse_float(&args[3], "click x")?;
            let click_y = parse_float(&args[4], "click y")?;
            let rendered = match (args.get(5), args.get(6)) {
                (Some(width), Some(height)) => Some((
                    parse_float(width, "rendered width")?,
                    parse_float(height, "rendered height")?,
                )),
                (Some(_), None) => {
                    return Err(CommandError::Usage(
                        "rendered size needs both width and height".to_string(),
                    ))
                }
                _ => None,
            };
            Ok(Command::Analyze {
                image: args[2].clone(),
                click_x,
                click_y,
                rendered,
            })
        }
        "health" => Ok(Command::Health),
        other => Err(CommandError::Usage(format!("unknown command: {other}"))),
    }
}

fn parse_float(raw: &str, what: &str) -> Result<f32, CommandError> {
    raw.parse::<f32>()
        .map_err(|_| CommandError::Usage(format!("invalid {what}: {raw}")))
}

fn run_command(
    command: Result<Command, CommandError>,
    config: &AppConfig,
) -> Result<(), CommandError> {
    match command? {
        Command::Ui { image } => {
            let mut service = build_service(config)?;
            ui::launch_window(&mut service, &config.base_url, image)
                .map_err(CommandError::Runtime)
        }
        Command::Analyze {
            image,
            click_x,
            click_y,
            rendered,
        } => run_analyze(config, &image, click_x, click_y, rendered),
        Command::Health => {
            let service = build_service(config)?;
            let health = service
                .check_health(HealthQuery)
                .map_err(|error| CommandError::Runtime(error.to_string()))?;
            println!("{}", present_health(&health));
            Ok(())
        }
    }
}

fn run_analyze(
    config: &AppConfig,
    image: &str,
    click_x: f32,
    click_y: f32,
    rendered: Option<(f32, f32)>,
) -> Result<(), CommandError> {
    let mut service = build_service(config)?;
    service
        .load_image(LoadImageCommand {
            path: image.to_string(),
        })
        .map_err(|error| CommandError::Runtime(format!("load failed: {error}")))?;

    let (rendered_width, rendered_height) = match rendered {
        Some(size) => size,
        None => {
            // Without an explicit rendered size the click is taken in
            // original-image coordinates.
            let asset = service
                .session()
                .asset()
                .ok_or_else(|| CommandError::Runtime("image missing after load".to_string()))?;
            (asset.natural_width() as f32, asset.natural_height() as f32)
        }
    };

    let sample = service
        .pick_color(PickColorCommand {
            rendered_width,
            rendered_height,
            click_x,
            click_y,
        })
        .map_err(|error| CommandError::Runtime(format!("pick failed: {error}")))?;
    println!("{}", present_sample(&sample));

    let ticket = service
        .start_analysis(StartAnalysisCommand)
        .map_err(|error| CommandError::Runtime(format!("analysis failed to start: {error}")))?;
    log::info!("analysis {} submitted to {}", ticket.get(), config.base_url);

    let deadline = Instant::now() + Duration::from_millis(OUTCOME_WAIT_MS);
    loop {
        let event = service
            .poll_outcome(PollOutcomeCommand)
            .map_err(|error| CommandError::Runtime(format!("outcome poll failed: {error}")))?;
        if let Some(SessionEvent::AnalysisFinished(_)) = event {
            break;
        }
        if Instant::now() >= deadline {
            return Err(CommandError::Runtime(
                "timed out waiting for the analysis outcome".to_string(),
            ));
        }
        thread::sleep(Duration::from_millis(25));
    }

    println!("{}", present_outcome(service.session().outcome()));
    Ok(())
}

fn print_usage() {
    println!("usage:");
    println!("  color-probe ui [image]");
    println!("  color-probe analyze <image> <x> <y> [rendered_w rendered_h]");
    println!("  color-probe health");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_opens_the_ui() {
        let args = vec!["color-probe".to_string()];
        let command = parse_command(&args).expect("ui should parse");
        assert!(matches!(command, Command::Ui { image: None }));
    }

    #[test]
    fn parse_analyze_command_with_rendered_size() {
        let args = [
            "color-probe", "analyze", "photo.png", "10", "10", "200", "200",
        ]
        .iter()
        .map(|part| part.to_string())
        .collect::<Vec<_>>();
        let command = parse_command(&args).expect("analyze should parse");
        match command {
            Command::Analyze {
                image,
                click_x,
                click_y,
                rendered,
            } => {
                assert_eq!(image, "photo.png");
                assert_eq!((click_x, click_y), (10.0, 10.0));
                assert_eq!(rendered, Some((200.0, 200.0)));
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn parse_analyze_rejects_bad_click() {
        let args = ["color-probe", "analyze", "photo.png", "ten", "10"]
            .iter()
            .map(|part| part.to_string())
            .collect::<Vec<_>>();
        assert!(matches!(
            parse_command(&args),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn parse_analyze_rejects_half_a_rendered_size() {
        let args = ["color-probe", "analyze", "photo.png", "10", "10", "200"]
            .iter()
            .map(|part| part.to_string())
            .collect::<Vec<_>>();
        assert!(matches!(
            parse_command(&args),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_command() {
        let args = vec!["color-probe".to_string(), "frobnicate".to_string()];
        assert!(matches!(
            parse_command(&args),
            Err(CommandError::Usage(_))
        ));
    }
}
