// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
#[cfg(feature = "server")]
fn init_telemetry() {
    use opentelemetry::global;
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use opentelemetry_sdk::runtime::TokioCurrentThread;
    use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, Registry};

    let app_name = "foodservice_recommendations";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[cfg(feature = "server")]
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;

    use actix_web::web::Data;
    use actix_web::{App, HttpServer};
    use anyhow::Context;
    use paperclip::actix::OpenApiExt;
    use tracing_actix_web::TracingLogger;

    use foodservice_recommendations::app_config::{config_app, cors_policy};
    use foodservice_recommendations::generative::GeminiClient;
    use foodservice_recommendations::normalizer::{AllowedValues, InputValidator};
    use foodservice_recommendations::ranker::PreferenceRanker;
    use foodservice_recommendations::reference_data::load_allowed_cuisines;
    use foodservice_recommendations::settings::Settings;
    use foodservice_recommendations::suggestions::FoodSuggestionGenerator;
    use foodservice_recommendations::weather::OpenWeatherClient;

    // A missing .env file is fine, the environment may be set up by other means
    dotenv::dotenv().ok();
    init_telemetry();

    let settings = Settings::load().context("Failed to load settings")?;
    if settings.weather_api_key.is_empty() {
        tracing::warn!("WEATHER_API_KEY is not set, weather lookups will fail");
    }
    if settings.genai_api_key.is_empty() {
        tracing::warn!("GENAI_API_KEY is not set, generation will fail");
    }

    let cuisines = load_allowed_cuisines(&settings.cuisines_file).await?;
    tracing::info!("Loaded {} allowed cuisines", cuisines.len());

    let weather_provider = OpenWeatherClient::new(
        &settings.weather_api_url,
        &settings.weather_api_key,
        settings.weather_max_retries,
    )?;
    let text_generator = GeminiClient::new(
        &settings.genai_api_url,
        &settings.genai_api_key,
        &settings.genai_model,
    )?;

    let validator = Data::new(InputValidator::new(
        AllowedValues::new(cuisines),
        settings.matching_policy(),
    ));
    let generator = Data::new(FoodSuggestionGenerator::new(
        Arc::new(weather_provider),
        Arc::new(text_generator),
        settings.suggestion_count,
    ));
    let ranker = Data::new(PreferenceRanker::new(
        settings.training_data_file.clone(),
        settings.ranking_policy(),
    ));

    tracing::info!(
        "starting HTTP server at http://{}:{}",
        settings.host,
        settings.port
    );

    let cors_origin = settings.cors_origin.clone();
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(validator.clone())
            .app_data(generator.clone())
            .app_data(ranker.clone())
            .wrap(cors_policy(&cors_origin))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
