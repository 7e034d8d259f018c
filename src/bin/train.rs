/// Fine-tune a pretrained text encoder with a classification head
use tokenizers::Tokenizer;

use textcls_rs::data::{load_data, BatchStream};
use textcls_rs::training::{Trainer, TrainerConfig};
use textcls_rs::{RunConfig, SequenceClassifier};

/// Positional overrides: train [dataset] [data_dir] [model_name] [method_name]
///
/// Everything else keeps its `RunConfig` default; unknown encoder or head
/// names fail here, before anything touches the dataset.
fn parse_args() -> anyhow::Result<RunConfig> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = RunConfig::default();
    if let Some(dataset) = args.first() {
        config.dataset = dataset.clone();
    }
    if let Some(data_dir) = args.get(1) {
        config.data_dir = data_dir.into();
    }
    if let Some(model_name) = args.get(2) {
        config.model_name = model_name.parse()?;
    }
    if let Some(method_name) = args.get(3) {
        config.method_name = method_name.parse()?;
    }

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = parse_args()?;
    config.validate()?;

    log::info!("> creating model {}", config.model_name);
    log::info!("> training arguments: {:#?}", config);

    let device = config.device()?;
    log::info!("Using device: {:?}", device);

    // Model construction comes first: a broken pretrained export fails
    // the run before any data is read.
    let (model, varmap) = SequenceClassifier::new(&config, &device)?;

    let tokenizer_path = config.pretrained_path().join("tokenizer.json");
    let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
        anyhow::anyhow!("failed to load tokenizer {}: {}", tokenizer_path.display(), e)
    })?;

    let (mut train_loader, mut test_loader) = load_data(&config, &tokenizer)?;
    log::info!(
        "Data loaded: {} train batches, {} test batches",
        train_loader.num_batches(),
        test_loader.num_batches()
    );

    let trainer_config = TrainerConfig::from_run(&config, train_loader.num_batches());
    let mut trainer = Trainer::new(model, varmap, trainer_config, device)?;

    let summary = trainer.run(&mut train_loader, &mut test_loader)?;

    log::info!(
        "Finished {} epochs, best acc {:.2}",
        summary.history.len(),
        summary.best.acc * 100.0
    );
    if let Some(log_name) = &config.log_name {
        log::info!("log saved: {}", log_name);
    }

    Ok(())
}
