use anyhow::{bail, Context};
use emodrift::models::{AnalyzerOptions, DriftFormulation, TokenMode};
use emodrift::services::classifier::ClassifierClient;
use emodrift::services::config_store::ConfigStore;
use emodrift::services::drift::{analyze_drift, analyze_drift_concurrent, GlyphMap};
use emodrift::services::text_processor::normalize_punctuation;
use std::sync::Arc;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    emodrift::init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  analyze_text <path.txt> [--text <inline text>] [--url <classifier url>] [--threshold <0..1>] [--fallback <label>] [--top-label] [--raw-drift] [--concurrent] [--sentences <n>] [--out <json_path>]\n\nNotes:\n  - The classifier sidecar must be reachable; override its URL with --url or EMODRIFT_CLASSIFIER_URL.\n  - `--raw-drift` scores transitions over the raw per-sentence sequence instead of the compacted timeline."
        );
        return Ok(());
    }

    let inline_text = parse_arg_value(&args, "--text");
    let url_arg = parse_arg_value(&args, "--url");
    let threshold_arg = parse_arg_value(&args, "--threshold");
    let fallback_arg = parse_arg_value(&args, "--fallback");
    let top_label = has_flag(&args, "--top-label");
    let raw_drift = has_flag(&args, "--raw-drift");
    let concurrent = has_flag(&args, "--concurrent");
    let sentences_n: usize = parse_arg_value(&args, "--sentences")
        .and_then(|s| s.parse().ok())
        .unwrap_or(50);
    let out_path = parse_arg_value(&args, "--out");

    // Stored configuration provides the defaults; flags override per run.
    let config = ConfigStore::default_config_dir()
        .map(ConfigStore::new)
        .map(|store| store.load())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))
        .context("loading configuration")?
        .unwrap_or_default();

    let mut options: AnalyzerOptions = config.analysis.clone();
    if let Some(t) = threshold_arg {
        options.threshold = t.parse().context("parsing --threshold")?;
    }
    if let Some(f) = fallback_arg {
        options.fallback_label = f;
    }
    if top_label {
        options.token_mode = TokenMode::TopLabelOnly;
    }
    if raw_drift {
        options.formulation = DriftFormulation::RawSequence;
    }
    options
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("validating analyzer options")?;

    let glyphs = GlyphMap::with_overrides(&config.glyphs);

    let raw_text = match inline_text {
        Some(t) => t,
        None => {
            let path = &args[1];
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?
        }
    };
    let text = normalize_punctuation(&raw_text);

    if text.trim().is_empty() {
        // Rejected before the pipeline runs; this is a warning, not an error.
        eprintln!("Warning: input is empty after trimming, nothing to analyze.");
        return Ok(());
    }

    let client = match url_arg.or(config.classifier.base_url) {
        Some(url) => ClassifierClient::new(&url),
        None => ClassifierClient::default(),
    };

    println!("Input: {} chars ({} bytes)", text.chars().count(), text.len());
    println!("Classifier: {}", client.base_url());
    println!("Threshold: {}", options.threshold);
    println!();

    if !client.is_available().await {
        bail!(
            "classifier service is not reachable at {}",
            client.base_url()
        );
    }

    let result = if concurrent {
        let client = Arc::new(client);
        analyze_drift_concurrent(&client, &text, &options, &glyphs)
            .await
            .context("drift analysis failed")?
    } else {
        analyze_drift(&client, &text, &options, &glyphs)
            .await
            .context("drift analysis failed")?
    };

    println!("Sentences: {}", result.sentence_count);
    for (i, (sentence, labels)) in result
        .sentences
        .iter()
        .zip(result.sentence_labels.iter())
        .take(sentences_n)
        .enumerate()
    {
        println!(
            "[S{:04}] bytes=[{},{}]  {}",
            i,
            sentence.start,
            sentence.end,
            preview(&sentence.text, 100)
        );
        println!(
            "        labels: {}{}",
            labels
                .labels
                .iter()
                .map(|l| format!("{} ({:.2})", l.label, l.score))
                .collect::<Vec<_>>()
                .join(", "),
            if labels.is_fallback { " [fallback]" } else { "" }
        );
    }
    if result.sentences.len() > sentences_n {
        println!("... ({} more sentences)", result.sentences.len() - sentences_n);
    }

    println!();
    println!("Emotion timeline: {}", result.timeline_display);
    println!(
        "Drift score: {:.2} ({})",
        result.drift_score, result.severity
    );

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&result).context("serializing result")?;
        std::fs::write(&out_path, json).with_context(|| format!("writing {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
