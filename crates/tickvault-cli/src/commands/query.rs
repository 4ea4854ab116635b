use tickvault_store::{QueryRequest, Store};

use crate::cli::QueryArgs;
use crate::error::CliError;
use crate::output;

pub fn run(args: &QueryArgs, store: &Store, pretty: bool) -> Result<(), CliError> {
    let request = QueryRequest {
        symbol: args.symbol.clone(),
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
        limit: args.limit,
        page: args.page,
    };

    let page = store.query(&request)?;
    output::render(&page, pretty)
}
