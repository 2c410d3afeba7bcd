use std::error::Error;
use std::net::SocketAddr;

use departure_gauge::domain::Itinerary;
use departure_gauge::gauge::{GaugeConfig, GaugeResponse, GaugeService, RouteProvider, TransitRequest};
use departure_gauge::refresh::{GaugeSession, RefreshConfig, SessionError};
use departure_gauge::routes::{MockRoutesClient, RoutesClient, RoutesConfig};
use departure_gauge::web::{AppState, create_router};
use tracing_subscriber::EnvFilter;

/// Address the server binds when `DEPARTURE_GAUGE_ADDR` is unset.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

const USAGE: &str = "usage: departure-gauge [watch <origin> <destination> [max_wait]]";

/// What the binary was asked to do.
enum Mode {
    Serve(SocketAddr),
    Watch(TransitRequest),
}

impl Mode {
    fn from_args(args: &[String]) -> Result<Self, Box<dyn Error>> {
        match args {
            [] => {
                let addr = std::env::var("DEPARTURE_GAUGE_ADDR")
                    .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
                    .parse()?;
                Ok(Mode::Serve(addr))
            }
            [cmd, origin, destination, rest @ ..] if cmd == "watch" && rest.len() <= 1 => {
                let max_wait = rest
                    .first()
                    .map(|s| s.parse::<u32>())
                    .transpose()
                    .map_err(|e| format!("invalid max_wait: {e}"))?;
                let request = TransitRequest::new(origin, destination, max_wait);
                request.validate()?;
                Ok(Mode::Watch(request))
            }
            _ => Err(USAGE.into()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = Mode::from_args(&args)?;

    // Serve canned responses when a fixture directory is configured
    if let Ok(dir) = std::env::var("DEPARTURE_GAUGE_MOCK_DIR") {
        let provider = MockRoutesClient::new(&dir)?;
        tracing::info!(
            %dir,
            fixtures = provider.fixture_count().await,
            "using mock routes provider"
        );
        return run(mode, provider).await;
    }

    let api_key = std::env::var("GOOGLE_MAPS_API_KEY").unwrap_or_else(|_| {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set. API calls will fail.");
        String::new()
    });
    let provider = RoutesClient::new(RoutesConfig::new(api_key))?;
    run(mode, provider).await
}

async fn run<P>(mode: Mode, provider: P) -> Result<(), Box<dyn Error>>
where
    P: RouteProvider + Send + Sync + 'static,
{
    match mode {
        Mode::Serve(addr) => serve(addr, provider).await,
        Mode::Watch(request) => watch(request, provider).await,
    }
}

async fn serve<P>(addr: SocketAddr, provider: P) -> Result<(), Box<dyn Error>>
where
    P: RouteProvider + Send + Sync + 'static,
{
    let state = AppState::new(provider, GaugeConfig::default());
    let app = create_router(state);

    println!("Departure Gauge listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health               - Health check");
    println!("  POST /api/routes/transit   - Departure readiness for a trip");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn watch<P>(request: TransitRequest, provider: P) -> Result<(), Box<dyn Error>>
where
    P: RouteProvider + Send + Sync + 'static,
{
    let service = GaugeService::new(provider, GaugeConfig::default());
    let session = GaugeSession::new(service.into(), request, RefreshConfig::default());

    println!(
        "Watching {} -> {} (Ctrl-C to quit)",
        session.request().origin,
        session.request().destination
    );

    session.run(print_update).await?;
    Ok(())
}

fn print_update(result: &Result<GaugeResponse, SessionError>) {
    let now = chrono::Local::now().format("%H:%M:%S");
    match result {
        Ok(response) => {
            let signal = &response.status;
            let next = signal
                .next_departure_time
                .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "[{now}] {:>3.0} {:<8} {:<6} {} (next {next}, every {:.0} min{})",
                signal.value,
                signal.status.to_string(),
                signal.status.color(),
                signal.message,
                response.frequency_meta.average_frequency_minutes,
                if response.frequency_meta.is_peak { ", peak" } else { "" },
            );
            if let Some(itinerary) = &signal.selected_itinerary {
                println!("           {}", route_summary(itinerary));
            }
        }
        Err(e) => println!("[{now}] error: {e}"),
    }
}

/// One-line description of an itinerary, e.g. `8 > 49 (32 min)`.
fn route_summary(itinerary: &Itinerary) -> String {
    let lines: Vec<&str> = itinerary
        .steps()
        .iter()
        .filter_map(|step| step.transit_details())
        .map(|details| details.display_line())
        .collect();
    let travel = itinerary.travel_time().num_minutes();

    if lines.is_empty() {
        format!("walk ({travel} min)")
    } else {
        format!("{} ({travel} min)", lines.join(" > "))
    }
}
