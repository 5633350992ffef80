mod script;

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use program_console::{AppState, ConsoleConfig, Message, Request, SessionHandle, spawn_session};
use program_engine::{Editor, EditorErrorKind, Event, HttpProgramBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Options {
    config: Option<PathBuf>,
    stream_id: String,
    ops: Vec<Request>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = resolve_options()?;
    let config = ConsoleConfig::load(options.config.as_deref())
        .context("failed to load configuration")?;
    init_tracing(&config.log.filter);

    let client = config.build_client().context("failed to build backend client")?;
    let backend = Arc::new(HttpProgramBackend::new(client));
    info!(
        stream_id = %options.stream_id,
        base_url = %config.backend.base_url,
        "opening program editor"
    );

    let mut app = AppState::new(config.backend.base_url.as_str());
    let mut handle = spawn_session(Editor::new(options.stream_id.as_str()), backend);

    for request in app.boot() {
        send(&handle, request)?;
    }
    wait_for(&mut handle, &mut app, |event| matches!(event, Event::ProgramChanged(_))).await;

    let mut submitted = false;
    for request in options.ops {
        let is_submit = request == Request::Submit;
        send(&handle, request)?;
        if is_submit {
            submitted = true;
            wait_for(&mut handle, &mut app, ends_submission).await;
            break;
        }
    }

    if !app.has_left() {
        let (_, events) = handle
            .shutdown()
            .await
            .map_err(|_| anyhow!("editor session stopped unexpectedly"))?;
        for event in events {
            app.update(Message::Session(event));
        }
    }

    print_program(&app);

    if submitted && !app.has_left() {
        let reason = app
            .error()
            .map(|error| error.message.clone())
            .unwrap_or_else(|| "no response from backend".to_string());
        bail!("program was not applied: {reason}");
    }
    Ok(())
}

fn send(handle: &SessionHandle, request: Request) -> Result<()> {
    handle
        .send(request)
        .map_err(|_| anyhow!("editor session stopped unexpectedly"))
}

async fn wait_for(
    handle: &mut SessionHandle,
    app: &mut AppState,
    done: impl Fn(&Event) -> bool,
) {
    while let Some(event) = handle.next_event().await {
        if let Event::Error(error) = &event {
            warn!(kind = ?error.kind, message = %error.message, "editor reported an error");
        }
        let finished = done(&event);
        app.update(Message::Session(event));
        if finished {
            return;
        }
    }
}

fn ends_submission(event: &Event) -> bool {
    match event {
        Event::ProgramApplied => true,
        Event::Error(error) => error.kind != EditorErrorKind::LoadFailed,
        _ => false,
    }
}

fn print_program(app: &AppState) {
    if app.has_left() {
        println!("Program applied.");
        return;
    }
    let Some(view) = app.view_model() else {
        println!("No program loaded.");
        return;
    };

    println!("Program: {}", view.name);
    println!("Quality: {} kbps, {}", view.quality.bitrate, view.quality.resolution);

    println!("Timeline:");
    for row in app.timeline_rows() {
        let marker = if row.selected { "*" } else { " " };
        println!("  {marker} {}. {} ({})", row.position, row.name, row.id);
    }
    if let Some(panel) = app.preview_panel() {
        let url = panel.url.as_deref().unwrap_or("unavailable");
        println!("Preview: {} [{}] {url}", panel.title, panel.play_label);
    }

    println!("Library:");
    for row in app.library_rows() {
        println!("    {} ({})", row.name, row.id);
    }

    println!("Targets:");
    for chip in app.target_chips() {
        println!("    {}", chip.value);
    }
    println!("Presets:");
    for preset in app.preset_buttons() {
        println!("    {} ({}): {}", preset.label, preset.preset_id, preset.masked_target);
    }

    if let Some(error) = app.error() {
        println!("Error: {}", error.message);
    }
    println!("Ready to apply: {}", if app.can_submit() { "yes" } else { "no" });
}

fn resolve_options() -> Result<Options> {
    let mut args = env::args().skip(1);
    let mut config = None;
    let mut stream_id = None;
    let mut ops = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                config = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            _ if stream_id.is_none() => stream_id = Some(arg.clone()),
            op => {
                let request =
                    script::parse_op(op).with_context(|| format!("bad operation: {op}"))?;
                ops.push(request);
            }
        }
    }

    let stream_id = stream_id.ok_or_else(|| anyhow!("missing stream id, see --help"))?;
    Ok(Options {
        config,
        stream_id,
        ops,
    })
}

fn print_usage() {
    println!("Usage: program-cli [--config PATH] <stream-id> [op ...]");
    println!();
    println!("Operations:");
    println!("  add=ID remove=ID earlier=ID later=ID reorder=SRC:DST");
    println!("  drag=library:ID|timeline:ID drop=ROW|container cancel-drag");
    println!("  preview=ID play pause");
    println!("  target=URL untarget=URL preset=ID");
    println!("  name=TEXT bitrate=KBPS resolution=WxH");
    println!("  apply");
}

fn init_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
