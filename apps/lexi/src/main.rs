use lexi_base::log;
use lexi_camera::{CameraConfig, V4l2Camera};
use lexi_client::{ClientConfig, ProcessClient};
use lexi_session::{ConsoleOverlay, Session, SessionConfig, Typography};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

struct Args {
    endpoint: String,
    device: String,
    spacing: usize,
    line_height: usize,
    delay_ms: u64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        endpoint: std::env::var("LEXI_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
        device: "/dev/video0".to_string(),
        spacing: 0,
        line_height: 1,
        delay_ms: 900,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| iter.next().ok_or(format!("{flag} needs a value"));
        match arg.as_str() {
            "--endpoint" => args.endpoint = value("--endpoint")?,
            "--device" => args.device = value("--device")?,
            "--spacing" => {
                args.spacing = value("--spacing")?
                    .parse()
                    .map_err(|_| "--spacing needs a number".to_string())?;
            }
            "--line-height" => {
                args.line_height = value("--line-height")?
                    .parse()
                    .map_err(|_| "--line-height needs a number".to_string())?;
            }
            "--delay-ms" => {
                args.delay_ms = value("--delay-ms")?
                    .parse()
                    .map_err(|_| "--delay-ms needs a number".to_string())?;
            }
            other => return Err(format!("unrecognized argument: {other}")),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lexi_base::init_stdout_logger();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            lexi_base::log_fatal!("{message}");
        }
    };

    log::info!("Live Text Overlay");
    log::info!("Endpoint: {}{}", args.endpoint, lexi_client::PROCESS_PATH);
    log::info!("Camera:   {}", args.device);

    let camera_config = CameraConfig::default().with_device(args.device.clone());
    let acquire = move || V4l2Camera::new(camera_config.clone());

    let client = ProcessClient::new(
        ClientConfig::default().with_base_url(args.endpoint.clone()),
    )?;

    let typography = Typography::default()
        .with_letter_spacing(args.spacing)
        .with_line_height(args.line_height);
    let overlay = ConsoleOverlay::stdout().with_typography(typography);

    let session_config =
        SessionConfig::default().with_poll_delay(Duration::from_millis(args.delay_ms));
    let (session, mut handle) = Session::new(acquire, client, overlay, session_config);
    let worker = tokio::spawn(session.run());

    println!("[{}]  Enter toggles, q quits", handle.label());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" => break,
            "" => {
                handle.toggle().await?;
                // Give acquisition and the first cycle a moment to settle so
                // the printed label reflects what actually happened.
                let _ = timeout(Duration::from_millis(1500), handle.phase_changed()).await;
                println!("[{}]", handle.label());
            }
            other => log::warn!("unrecognized input: {other:?}"),
        }
    }

    handle.shutdown().await;
    worker.await?;

    Ok(())
}
