use std::io::Write;
use std::process::ExitCode;

use env_logger::Env;
use log::{error, info};
use sam_knn::{SamKnn, SamKnnConfig};
use samknn_eval::{evaluate_dataset, Dataset, Error};

const FEATURES_PATH: &str = "data/datasets/movingSquares.data";
const LABELS_PATH: &str = "data/datasets/movingSquares.labels";

const PARAMS: [(&str, &str); 5] = [
    ("maxSize", "1000"),
    ("nNeighbours", "5"),
    ("knnWeights", "distance"),
    ("STMSizeAdaption", "maxACCApprox"),
    ("useLTM", "false"),
];

fn run() -> Result<f64, Error> {
    let config = SamKnnConfig::from_params(PARAMS)?;
    info!("{config:?}");
    let mut model: SamKnn<u8> = SamKnn::new(config)?;

    info!("loading dataset");
    let dataset = Dataset::load(FEATURES_PATH, LABELS_PATH)?;
    let report = evaluate_dataset(&mut model, &dataset)?;
    info!(
        "final memory: {} STM samples, {} LTM samples",
        model.stm_len(),
        model.ltm_len()
    );
    Ok(report.error_rate)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    match run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
