use tickvault_store::{StatisticsRequest, Store};

use crate::cli::StatsArgs;
use crate::error::CliError;
use crate::output;

pub fn run(args: &StatsArgs, store: &Store, pretty: bool) -> Result<(), CliError> {
    let request = StatisticsRequest {
        symbol: args.symbol.clone(),
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
    };

    let statistics = store.statistics(&request)?;
    output::render(&statistics, pretty)
}
