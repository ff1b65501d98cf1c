//! Check encoder availability.

use chatreel_export_engine::{negotiate_codec, probe_codecs, FrameEncoder, GstFrameEncoder};
use chatreel_script_model::format::ContainerFormat;

pub fn run() -> anyhow::Result<()> {
    println!("Chatreel System Check");
    println!("{}", "=".repeat(50));

    let encoder = GstFrameEncoder::new();
    if encoder.is_available() {
        println!("[OK] GStreamer runtime initialized");
    } else {
        println!("[WARN] GStreamer runtime unavailable");
        println!();
        println!("Install GStreamer 1.20+ with the base and good plugin sets.");
        return Ok(());
    }

    for container in [ContainerFormat::Webm, ContainerFormat::Mp4] {
        println!();
        println!("Container: {container}");
        match probe_codecs(container) {
            Ok(codecs) => {
                for (codec, installed) in codecs {
                    if installed {
                        println!("  [OK] {codec} ({})", codec.element_name());
                    } else {
                        println!("  [WARN] {codec} ({}) not installed", codec.element_name());
                    }
                }
            }
            Err(e) => println!("  [WARN] Probe failed: {e}"),
        }
        match negotiate_codec(container) {
            Ok(codec) => println!("  Will encode {container} with {codec}"),
            Err(_) => println!("  No usable encoder for {container}"),
        }
    }

    println!();
    match negotiate_codec(ContainerFormat::Webm) {
        Ok(_) => println!("Chatreel is ready to export."),
        Err(_) => println!("Install vp9enc or vp8enc (gst-plugins-good) to export webm clips."),
    }

    Ok(())
}
