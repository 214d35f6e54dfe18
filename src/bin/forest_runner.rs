use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use decision_forest::data::csv::read_csv;
use decision_forest::data::dataset::Dataset;
use decision_forest::forests::{ForestParams, RandomForest};
use decision_forest::metrics::accuracy::AccuracyReport;
use decision_forest::metrics::errors::RegressionMetrics;
use decision_forest::trees::{DecisionTree, SplitMode, Task, TreeParams};
use decision_forest::Result;
use log::{error, info};
use nalgebra::DVector;

/// Train a decision tree or random forest on a CSV file and evaluate it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Training data, one row per line with the label in the last column.
    train: PathBuf,

    /// Test data in the same layout. When omitted, a quarter of the training
    /// rows is held out instead.
    test: Option<PathBuf>,

    /// Skip the first line of each file.
    #[arg(long, default_value_t = false)]
    header: bool,

    /// Treat features as categories and split on every distinct value.
    #[arg(long, default_value_t = false)]
    discrete: bool,

    /// Predict numeric targets instead of class labels.
    #[arg(long, default_value_t = false)]
    regression: bool,

    /// Grow a random forest instead of a single tree.
    #[arg(long, default_value_t = false)]
    forest: bool,

    /// Subsets smaller than this become leaves (single tree only).
    #[arg(long, default_value_t = 1)]
    min_data_size: usize,

    /// Number of trees in the forest.
    #[arg(long, default_value_t = 1000)]
    trees: usize,

    /// Rows per bootstrap sample. Defaults to two thirds of the training rows.
    #[arg(long)]
    bag_size: Option<usize>,

    /// Seed for every random choice, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the per-row report to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print this many trees (the single tree is printed whole).
    #[arg(long)]
    print_trees: Option<usize>,
}

impl Cli {
    fn split_mode(&self) -> SplitMode {
        if self.discrete {
            SplitMode::Discrete
        } else {
            SplitMode::Continuous
        }
    }

    fn task(&self) -> Task {
        if self.regression {
            Task::Regression
        } else {
            Task::Classification
        }
    }
}

fn load(cli: &Cli) -> Result<(Dataset<f64>, Dataset<f64>)> {
    let train = read_csv(&cli.train, cli.header)?;
    match &cli.test {
        Some(path) => Ok((train, read_csv(path, cli.header)?)),
        None => {
            info!("No test file given, holding out 25% of the training rows.");
            train.train_test_split(0.75, cli.seed)
        }
    }
}

fn run_tree(cli: &Cli, train: &Dataset<f64>, test: &Dataset<f64>) -> Result<DVector<f64>> {
    let mut params = TreeParams::new();
    params.set_split_mode(cli.split_mode());
    params.set_task(cli.task());
    params.set_min_data_size(cli.min_data_size)?;
    params.set_seed(cli.seed);

    let mut tree = DecisionTree::with_params(params);
    tree.fit(train)?;
    if cli.print_trees.is_some() {
        print!("{}", tree);
    }

    let predictions = tree.predict(&test.x)?;
    if cli.regression {
        report_errors(&tree, &test.y, &predictions)?;
    }
    Ok(predictions)
}

fn run_forest(cli: &Cli, train: &Dataset<f64>, test: &Dataset<f64>) -> Result<DVector<f64>> {
    let mut params = ForestParams::new();
    params.set_num_trees(cli.trees)?;
    params.set_bag_size(cli.bag_size)?;
    params.set_split_mode(cli.split_mode());
    params.set_task(cli.task());
    params.set_seed(cli.seed);

    let mut forest = RandomForest::with_params(params);
    forest.fit(train)?;
    if let Some(sample_size) = cli.print_trees {
        for (i, dump) in forest.sample_dumps(sample_size)?.iter().enumerate() {
            println!("Tree {}:", i + 1);
            for node in dump {
                println!("{}", node);
            }
        }
    }

    let predictions = forest.predict(&test.x)?;
    if cli.regression {
        report_errors(&forest, &test.y, &predictions)?;
    }
    Ok(predictions)
}

fn report_errors<M: RegressionMetrics<f64>>(
    model: &M,
    truth: &DVector<f64>,
    predictions: &DVector<f64>,
) -> Result<()> {
    println!("MSE: {:.4}", model.mse(truth, predictions)?);
    println!("MAE: {:.4}", model.mae(truth, predictions)?);
    println!("R2: {:.4}", model.r2(truth, predictions)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let (train, test) = load(&cli)?;
    info!(
        "Loaded {} training and {} test rows.",
        train.nrows(),
        test.nrows()
    );

    let predictions = if cli.forest {
        run_forest(&cli, &train, &test)?
    } else {
        run_tree(&cli, &train, &test)?
    };

    let report = AccuracyReport::compute(test.labels(), predictions.as_slice())?;
    if let Some(path) = &cli.report {
        fs::write(path, report.to_string())?;
        info!("Wrote report to {}.", path.display());
    }
    println!(
        "Accuracy: {:.2}% ({} of {})",
        report.ratio() * 100.0,
        report.correct(),
        report.total()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
