//! Record a conversation into a video clip.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chatreel_chat_surface::{ChatSurface, SurfaceStyle};
use chatreel_common::config::AppConfig;
use chatreel_export_engine::{
    ExportController, ExportNotice, ExportOptions, GstFrameEncoder, NoticeCallback,
};
use chatreel_script_model::conversation::Conversation;
use chatreel_script_model::format::{ContainerFormat, ExportFormat};
use chatreel_script_model::playback::Playback;
use chatreel_script_model::script::{replay_script, ReplayTiming};
use chatreel_script_model::templates;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    input: Option<PathBuf>,
    template: Option<String>,
    format: String,
    width: Option<u32>,
    height: Option<u32>,
    container: Option<String>,
    output: Option<PathBuf>,
    padding: Option<f64>,
    bitrate: Option<u32>,
    scale: Option<u32>,
) -> anyhow::Result<()> {
    let config = AppConfig::load();

    let conversation = load_conversation(input, template)?;
    if conversation.messages.is_empty() {
        return Err(anyhow::anyhow!("Conversation has no messages to animate"));
    }

    let mut export_format = ExportFormat::preset(&format).ok_or_else(|| {
        anyhow::anyhow!("Unknown format: {format}. Run `chatreel formats` to list the presets")
    })?;
    if let Some(name) = container {
        export_format.container = parse_container(&name)?;
    }
    if width.is_some() || height.is_some() {
        export_format = ExportFormat::custom(
            width.unwrap_or(export_format.width),
            height.unwrap_or(export_format.height),
            export_format.container,
        );
    }

    let options = ExportOptions {
        padding_fraction: padding.unwrap_or(config.export.padding_fraction),
        sample_period: Duration::from_millis(config.export.sample_period_ms),
        video_bitrate_kbps: bitrate.unwrap_or(config.export.video_bitrate_kbps),
        output_dir: output.unwrap_or_else(|| config.exports_dir.clone()),
        file_prefix: "chatreel".to_string(),
    };

    let timing = ReplayTiming::default();
    let clip_secs = timing
        .total_duration(conversation.messages.len())
        .as_secs_f64();

    println!("Exporting conversation '{}'", conversation.id);
    println!("  Messages: {}", conversation.messages.len());
    println!(
        "  Format: {} ({}x{}, {})",
        export_format.name, export_format.width, export_format.height, export_format.container
    );
    println!("  Output dir: {}", options.output_dir.display());
    println!("  Clip length: {clip_secs:.1}s");

    let playback = Playback::new();
    let style = SurfaceStyle {
        scale_factor: scale.unwrap_or(config.export.surface_scale),
        ..SurfaceStyle::default()
    };
    let mut surface = ChatSurface::with_style(conversation.clone(), playback.clone(), style);
    let script = replay_script(conversation.messages.len(), playback, timing);

    let notices: NoticeCallback = Box::new(|notice| match notice {
        ExportNotice::Started { format } => println!("  Recording ({format})..."),
        ExportNotice::Progress { frames } => {
            print!("\r  Frames captured: {frames}  ");
            let _ = std::io::stdout().flush();
        }
        // the final result is reported from the command itself
        ExportNotice::Completed { .. } | ExportNotice::Failed { .. } => {}
    });

    let controller =
        ExportController::new(Box::new(GstFrameEncoder::new()), options).with_notices(notices);

    match controller
        .start_export(&mut surface, script, &export_format)
        .await
    {
        Ok(outcome) => {
            println!(
                "\n[OK] Export complete in {:.1}s: {}",
                outcome.duration_secs,
                outcome.path.display()
            );
            println!("     {} frames, {} bytes", outcome.frames, outcome.bytes);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Export failed: {e}")),
    }
}

fn parse_container(name: &str) -> anyhow::Result<ContainerFormat> {
    match name.to_ascii_lowercase().as_str() {
        "webm" => Ok(ContainerFormat::Webm),
        "mp4" => Ok(ContainerFormat::Mp4),
        other => Err(anyhow::anyhow!(
            "Unknown container: {other}. Use `webm` or `mp4`"
        )),
    }
}

fn load_conversation(
    input: Option<PathBuf>,
    template: Option<String>,
) -> anyhow::Result<Conversation> {
    match (input, template) {
        (Some(path), _) => {
            println!("Loading conversation from: {}", path.display());
            Conversation::load(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load conversation: {e}"))
        }
        (None, Some(name)) => templates::by_name(&name).ok_or_else(|| {
            anyhow::anyhow!("Unknown template: {name}. Run `chatreel templates` to list them")
        }),
        (None, None) => Ok(templates::starter()),
    }
}
