use agrismart::core::query::fallback_reply;
use agrismart::core::ConfigProvider;
use agrismart::utils::{logger, validation::Validate};
use agrismart::{
    extract_crop_details, AgriConfig, AgriError, BatchPipeline, CliConfig, Command, CropPredictor,
    Dataset, LeafDiseaseClassifier, LocalStorage, PredictionEngine, PredictionOutcome, RawRequest,
    TfServingBackend,
};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置並套用命令列覆蓋
    let mut config = match AgriConfig::from_file_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Some(dataset) = &cli.dataset {
        config.dataset.path = dataset.clone();
    }

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting agrismart CLI");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = cli.monitor || config.monitoring_enabled();

    let result = match cli.command.clone() {
        Command::Predict {
            location,
            soil,
            area,
            json,
        } => run_predict(&config, RawRequest::new(location, soil, area), json).await,
        Command::Ask { query } => match extract_crop_details(&query) {
            Some(request) => run_predict(&config, request, false).await,
            None => {
                tracing::debug!("No crop details found in query, using keyword reply");
                println!("💬 {}", fallback_reply(&query));
                Ok(())
            }
        },
        Command::Batch { input, output } => {
            config.batch.requests = input;
            if let Some(output) = output {
                config.output.path = output;
            }
            run_batch(config, monitor_enabled).await
        }
        Command::Classify { image, model } => run_classify(&config, &image, model).await,
    };

    if let Err(e) = result {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run_predict(config: &AgriConfig, request: RawRequest, json: bool) -> agrismart::Result<()> {
    let storage = LocalStorage::new(".");
    let dataset = Dataset::load(&storage, config.dataset_path()).await?;
    let predictor = CropPredictor::new(&dataset, config.predictor_settings());

    let outcome = predictor.predict(&request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome {
        PredictionOutcome::Predicted(result) => {
            println!("🌱 Predicted Crop: {}", result.predicted_crop);
            println!(
                "📈 Estimated Yield (for {} acres): {:.2}",
                result.area_acres, result.estimated_yield
            );
            println!(
                "💰 Estimated Price (for {} acres): {:.2}",
                result.area_acres, result.estimated_price
            );
        }
        PredictionOutcome::NoData { .. } | PredictionOutcome::Invalid { .. } => {
            println!("⚠️ {}", outcome.message());
        }
    }
    Ok(())
}

async fn run_batch(config: AgriConfig, monitor_enabled: bool) -> agrismart::Result<()> {
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let dataset = Dataset::load(&storage, config.dataset_path()).await?;
    let settings = config.predictor_settings();
    let pipeline = BatchPipeline::new(storage, config, dataset, settings);

    let engine = PredictionEngine::new_with_monitoring(pipeline, monitor_enabled);
    let output_path = engine.run().await?;

    println!("✅ Batch prediction completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn run_classify(config: &AgriConfig, image_path: &str, model: Option<agrismart::ModelId>) -> agrismart::Result<()> {
    agrismart::utils::validation::validate_file_extension("image", image_path, &["jpg", "jpeg", "png"])?;
    let model = model.unwrap_or(config.classifier.default_model);

    let backend = TfServingBackend::new(
        config.classifier.endpoint.clone(),
        Duration::from_secs(config.classifier.timeout_seconds),
    )?;
    let classifier = LeafDiseaseClassifier::new(backend, config.disease_labels()?, config.classifier.image_size)
        .with_served_name(model, config.served_model_name(model));

    let bytes = tokio::fs::read(image_path).await.map_err(AgriError::IoError)?;
    let diagnosis = classifier.classify(&bytes, model).await?;

    println!("🔍 Predicted Class: {}", diagnosis.display_label);
    println!("🧠 Confidence: {:.2}%", diagnosis.confidence_pct);
    println!("{}", diagnosis.summary());
    Ok(())
}
