use std::{fs::File, io, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use pms_client::{credentials::DEFAULT_PROPERTY_ID, ApiClient, ApiEndpoints, Credentials};
use rand::prelude::*;
use rand_pcg::Pcg64;
use reservation_synthesiser::{
    orchestration::ProgressEvent, parsing, writing, Orchestrator, RoomTypeConfig, RunRequest,
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Creates synthetic reservations so that each room type reaches a target occupancy.
#[derive(StructOpt)]
struct Cli {
    /// The API access token
    #[structopt(long, env = "PMS_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// The property the reservations are created for
    #[structopt(long, env = "PMS_PROPERTY_ID")]
    property_id: Option<String>,

    /// The root of the API, defaults to the production API
    #[structopt(long, env = "PMS_API_BASE_URL")]
    api_base_url: Option<String>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Checks that the API accepts the credentials
    TestConnection,
    /// Lists the room types of the property as JSON
    RoomTypes,
    /// Creates the reservations
    Create {
        /// The first night that can be booked (YYYY-MM-DD)
        #[structopt(long)]
        start_date: String,

        /// The last possible checkout date (YYYY-MM-DD)
        #[structopt(long)]
        end_date: String,

        /// A CSV file with the header roomTypeID,roomTypeName,roomTypeUnits,percentage
        #[structopt(long, parse(from_os_str))]
        room_types: Option<PathBuf>,

        /// Apply this occupancy percentage to every room type of the property instead
        #[structopt(long)]
        percentage: Option<f64>,

        /// Where to write the JSON summary, defaults to stdout
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        /// Set seed to get reproducible guests and stays
        #[structopt(short = "s", long = "seed")]
        seed: Option<u64>,
    },
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_tracing();
    let args = Cli::from_args();
    let credentials = Credentials::new(
        args.access_token.unwrap_or_default(),
        args.property_id
            .unwrap_or_else(|| DEFAULT_PROPERTY_ID.to_string()),
    );
    let endpoints = args
        .api_base_url
        .map(ApiEndpoints::new)
        .unwrap_or_default();
    let client = ApiClient::new().context("Could not set up the HTTP client")?;
    let orchestrator = Orchestrator::new(client, endpoints);

    match args.command {
        Command::TestConnection => {
            if !credentials.has_access_token() {
                bail!("Please configure your access token first.");
            }
            pms_client::test_connection(
                orchestrator.client(),
                orchestrator.endpoints(),
                &credentials,
            )
            .context("Connection test failed")?;
            println!("Connection successful!");
        }
        Command::RoomTypes => {
            if !credentials.has_access_token() {
                bail!("Access token not configured");
            }
            let room_types = pms_client::list_room_types(
                orchestrator.client(),
                orchestrator.endpoints(),
                &credentials,
            )
            .context("Could not list room types")?;
            serde_json::to_writer_pretty(io::stdout().lock(), &room_types)?;
            println!();
        }
        Command::Create {
            start_date,
            end_date,
            room_types,
            percentage,
            output,
            seed,
        } => {
            let room_type_configs = match (room_types, percentage) {
                (Some(path), None) => parsing::read_room_type_configs(path)?,
                (None, Some(percentage)) => {
                    uniform_configs(&orchestrator, &credentials, percentage)?
                }
                _ => bail!("Pass exactly one of --room-types and --percentage"),
            };
            let rng = match seed {
                Some(seed) => Pcg64::seed_from_u64(seed),
                None => Pcg64::from_entropy(),
            };
            let request = RunRequest {
                credentials,
                start_date: Some(start_date),
                end_date: Some(end_date),
                room_type_configs,
            };
            let handle = reservation_synthesiser::spawn_run(Arc::new(orchestrator), request, rng)
                .context("Could not start the reservation run")?;
            for event in handle.progress().iter() {
                if let ProgressEvent::ReservationCompleted {
                    completed,
                    expected_total,
                    ..
                } = event
                {
                    if expected_total > 0 {
                        info!(
                            "Overall progress: {}/{} ({}% complete)",
                            completed,
                            expected_total,
                            completed * 100 / expected_total
                        );
                    }
                }
            }
            let summary = handle.join()?;
            writing::log_run_summary(&summary);
            match output {
                Some(path) => {
                    let file = File::create(&path).with_context(|| {
                        format!("Failed to create file: {:?}", path.as_os_str())
                    })?;
                    writing::write_summary(file, &summary)?;
                    println!("The summary has been saved as {:?}", path.as_os_str());
                }
                None => writing::write_summary(io::stdout().lock(), &summary)?,
            }
        }
    }
    Ok(())
}

// Every room type of the property with the same target percentage.
fn uniform_configs(
    orchestrator: &Orchestrator,
    credentials: &Credentials,
    percentage: f64,
) -> Result<Vec<RoomTypeConfig>> {
    if !(0.0..=100.0).contains(&percentage) {
        bail!("The percentage {} is not between 0 and 100", percentage);
    }
    if !credentials.has_access_token() {
        bail!("Access token not configured");
    }
    let room_types =
        pms_client::list_room_types(orchestrator.client(), orchestrator.endpoints(), credentials)
            .context("Could not list room types")?;
    Ok(room_types
        .into_iter()
        .map(|room_type| RoomTypeConfig {
            room_type_id: room_type.room_type_id,
            room_type_name: room_type.room_type_name,
            room_type_units: room_type.room_type_units,
            percentage,
        })
        .collect())
}
