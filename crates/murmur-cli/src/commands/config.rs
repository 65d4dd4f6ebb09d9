//! Configuration command: the preferences surface the core reads from.

use anyhow::Result;
use clap::Args;

use murmur_core::Settings;

#[derive(Args)]
pub struct ConfigArgs {
    /// Set the OpenAI API key used for transcription
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Set the transcription model name
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Set the capture input backend passed to ffmpeg's -f flag (alsa, pulse)
    #[arg(long, value_name = "BACKEND")]
    input_backend: Option<String>,

    /// Set the capture audio codec passed to ffmpeg's -c:a flag
    #[arg(long, value_name = "CODEC")]
    audio_codec: Option<String>,

    /// Set the accelerator that toggles recording (e.g. "<Control><Alt>a")
    #[arg(long, value_name = "ACCEL")]
    shortcut: Option<String>,

    /// Disable the toggle shortcut, remembering the current binding
    #[arg(long, conflicts_with_all = ["shortcut", "enable_shortcut"])]
    disable_shortcut: bool,

    /// Re-enable the toggle shortcut from its remembered binding
    #[arg(long, conflicts_with = "shortcut")]
    enable_shortcut: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut settings = Settings::load();
    let mut changed = false;

    if let Some(api_key) = args.api_key {
        settings.api_key = Some(api_key);
        changed = true;
    }
    if let Some(model) = args.model {
        settings.model = model;
        changed = true;
    }
    if let Some(input_backend) = args.input_backend {
        settings.input_backend = input_backend;
        changed = true;
    }
    if let Some(audio_codec) = args.audio_codec {
        settings.audio_codec = audio_codec;
        changed = true;
    }
    if let Some(shortcut) = args.shortcut {
        settings.set_shortcut(&shortcut);
        changed = true;
    }
    if args.disable_shortcut {
        settings.disable_shortcut();
        changed = true;
    }
    if args.enable_shortcut {
        settings.enable_shortcut();
        changed = true;
    }

    if changed {
        settings.save()?;
        println!("Settings saved to {}", Settings::config_path().display());
    }

    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("api_key:        {}", describe_key(settings.api_key.as_deref()));
    println!("model:          {}", settings.model);
    println!("input_backend:  {}", settings.input_backend);
    println!("audio_codec:    {}", settings.audio_codec);
    println!(
        "shortcut:       {}",
        settings.shortcut().unwrap_or("disabled")
    );
}

fn describe_key(key: Option<&str>) -> String {
    match key {
        Some(key) if !key.trim().is_empty() => mask_key(key),
        _ => "not set (OPENAI_API_KEY environment fallback applies)".to_string(),
    }
}

/// Keep just enough of the key to recognize it.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
