fn main() {
    if let Err(e) = run() {
        eprintln!("benchmark failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    use recital_core::{
        config::VoiceSettings,
        matching::{MatchMode, Matcher},
        playback::{stub::RecordingVoice, SynthesisEvent},
        segment_sentences, PlaybackScheduler, ProgressRenderer, Sentence,
    };
    use serde::Serialize;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};
    use tracing_subscriber::EnvFilter;

    const SAMPLE_TEXT: &str = "The quick brown fox jumps over the lazy dog. \
        She sells sea shells by the sea shore! \
        How much wood would a woodchuck chuck if a woodchuck could chuck wood? \
        Peter Piper picked a peck of pickled peppers.\n\n\
        A journey of a thousand miles begins with a single step. \
        Practice makes perfect.";

    #[derive(Debug)]
    struct Args {
        text: Option<PathBuf>,
        iterations: usize,
        threshold: f64,
        output: Option<PathBuf>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct CaseResult {
        category: String,
        sentence_index: usize,
        iteration: usize,
        latency_us: f64,
        keystrokes: usize,
        accuracy: f64,
        complete: bool,
    }

    #[derive(Debug, Clone, Serialize)]
    struct CategorySummary {
        category: String,
        runs: usize,
        p50_latency_us: f64,
        p95_latency_us: f64,
        avg_latency_us: f64,
        completion_rate: f64,
        avg_accuracy: f64,
    }

    #[derive(Debug, Clone, Serialize)]
    struct Summary {
        source: String,
        iterations: usize,
        sentences: usize,
        total_runs: usize,
        sequence_dispatch_us: f64,
        categories: Vec<CategorySummary>,
        cases: Vec<CaseResult>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut text: Option<PathBuf> = None;
        let mut iterations: usize = 3;
        let mut threshold = 0.7;
        let mut output: Option<PathBuf> = None;

        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--text" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --text".into());
                    };
                    text = Some(PathBuf::from(v));
                }
                "--iterations" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --iterations".into());
                    };
                    iterations = v
                        .parse::<usize>()
                        .map_err(|_| "invalid value for --iterations".to_string())?
                        .clamp(1, 100);
                }
                "--threshold" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --threshold".into());
                    };
                    threshold = v
                        .parse::<f64>()
                        .map_err(|_| "invalid value for --threshold".to_string())?;
                }
                "--output" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --output".into());
                    };
                    output = Some(PathBuf::from(v));
                }
                "--help" | "-h" => {
                    println!(
                        "Usage: cargo run -p recital-core --bin benchmark -- \\
  [--text <file.txt>] [--iterations <n>] [--threshold <0..1>] [--output <file.json>]"
                    );
                    std::process::exit(0);
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
        }

        Ok(Args {
            text,
            iterations,
            threshold,
            output,
        })
    }

    fn percentile(values: &[f64], p: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = ((sorted.len() - 1) as f64 * p.clamp(0.0, 1.0)).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    fn summarize(category: String, rows: &[CaseResult]) -> CategorySummary {
        let latencies = rows.iter().map(|r| r.latency_us).collect::<Vec<_>>();
        let accuracies = rows.iter().map(|r| r.accuracy).collect::<Vec<_>>();
        let completed = rows.iter().filter(|r| r.complete).count();
        CategorySummary {
            category,
            runs: rows.len(),
            p50_latency_us: percentile(&latencies, 0.50),
            p95_latency_us: percentile(&latencies, 0.95),
            avg_latency_us: mean(&latencies),
            completion_rate: if rows.is_empty() {
                0.0
            } else {
                completed as f64 / rows.len() as f64
            },
            avg_accuracy: mean(&accuracies),
        }
    }

    /// Keystroke-by-keystroke dictation of a sentence's letters.
    fn typed_prefixes(sentence: &str) -> Vec<String> {
        let letters = sentence
            .chars()
            .filter(|c| c.is_alphabetic() || *c == ' ')
            .collect::<String>();
        let mut out = Vec::new();
        let mut typed = String::new();
        for c in letters.chars() {
            typed.push(c);
            out.push(typed.clone());
        }
        out
    }

    /// Word-by-word recitation with every fourth word misheard.
    fn spoken_prefixes(sentence: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut spoken: Vec<String> = Vec::new();
        for (i, word) in sentence.split_whitespace().enumerate() {
            let clean = word
                .chars()
                .filter(|c| c.is_alphabetic())
                .collect::<String>()
                .to_lowercase();
            spoken.push(if i % 4 == 3 { format!("{clean}s") } else { clean });
            out.push(spoken.join(" "));
        }
        out
    }

    fn time_sequence(sentences: &[Sentence]) -> Result<f64, String> {
        let (voice, log) = RecordingVoice::new();
        let scheduler = PlaybackScheduler::new(voice, VoiceSettings::default(), Duration::ZERO);
        let started = Instant::now();
        scheduler
            .speak_all(sentences.to_vec(), 0)
            .map_err(|e| e.to_string())?;
        while let Some(id) = scheduler.in_flight() {
            scheduler.handle_event(id, SynthesisEvent::Start);
            scheduler.handle_event(id, SynthesisEvent::End);
        }
        let elapsed = started.elapsed().as_secs_f64() * 1_000_000.0;
        if log.requests().len() > sentences.len() {
            return Err("sequence issued more requests than sentences".into());
        }
        Ok(elapsed)
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();

    let args = parse_args()?;
    let (source, raw) = match &args.text {
        Some(path) => (
            path.display().to_string(),
            std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?,
        ),
        None => ("<built-in sample>".to_string(), SAMPLE_TEXT.to_string()),
    };

    let sentences = segment_sentences(&raw);
    if sentences.is_empty() {
        return Err(format!("no sentences found in {source}"));
    }

    println!(
        "Running recital benchmark on {} sentences (iterations={})",
        sentences.len(),
        args.iterations
    );

    let renderer = ProgressRenderer::new(args.threshold);
    let modes = [
        (MatchMode::Character, "dictation"),
        (MatchMode::Word, "recitation"),
    ];

    let mut cases = Vec::new();
    for sentence in &sentences {
        for (mode, category) in modes {
            let matcher = mode.matcher(args.threshold);
            let inputs = match mode {
                MatchMode::Character => typed_prefixes(&sentence.text),
                MatchMode::Word => spoken_prefixes(&sentence.text),
            };
            for iteration in 1..=args.iterations {
                let started = Instant::now();
                let mut last = None;
                for candidate in &inputs {
                    let result = matcher.evaluate(&sentence.text, candidate);
                    let cursor = match mode {
                        MatchMode::Character => {
                            candidate.chars().filter(|c| c.is_alphabetic()).count()
                        }
                        MatchMode::Word => candidate.split_whitespace().count(),
                    };
                    let display = renderer.render(mode, &sentence.text, candidate, Some(cursor));
                    std::hint::black_box(&display);
                    last = Some(result);
                }
                let latency_us = started.elapsed().as_secs_f64() * 1_000_000.0;
                let (accuracy, complete) = last
                    .map(|r| (r.accuracy, r.complete))
                    .unwrap_or((0.0, false));
                cases.push(CaseResult {
                    category: category.to_string(),
                    sentence_index: sentence.index,
                    iteration,
                    latency_us,
                    keystrokes: inputs.len(),
                    accuracy,
                    complete,
                });
            }
        }
    }

    let sequence_dispatch_us = time_sequence(&sentences)?;

    let mut grouped: BTreeMap<String, Vec<CaseResult>> = BTreeMap::new();
    for row in &cases {
        grouped
            .entry(row.category.clone())
            .or_default()
            .push(row.clone());
    }
    let categories = grouped
        .into_iter()
        .map(|(name, rows)| summarize(name, &rows))
        .collect::<Vec<_>>();

    for c in &categories {
        println!(
            "{}: runs={} p50={:.1}us p95={:.1}us completion={:.0}%",
            c.category,
            c.runs,
            c.p50_latency_us,
            c.p95_latency_us,
            c.completion_rate * 100.0
        );
    }

    let summary = Summary {
        source,
        iterations: args.iterations,
        sentences: sentences.len(),
        total_runs: cases.len(),
        sequence_dispatch_us,
        categories,
        cases,
    };

    println!(
        "Done. runs={} sequence_dispatch={:.1}us",
        summary.total_runs, summary.sequence_dispatch_us
    );

    let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
    if let Some(out) = args.output {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        std::fs::write(&out, json).map_err(|e| e.to_string())?;
        println!("Wrote benchmark report: {}", out.display());
    }

    Ok(())
}
