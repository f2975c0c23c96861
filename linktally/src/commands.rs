use crate::CLAP_STYLING;
use clap::arg;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("linktally")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linktally")
        .styles(CLAP_STYLING)
        .about("Crawl a site and tally how often each internal page is referenced")
        .arg(arg!(<URL> "The base URL to crawl"))
        .arg(
            arg!(-t --"threads" <NUM_WORKERS>)
                .required(false)
                .help("The number of async worker 'threads' in the worker pool.")
                .value_parser(clap::value_parser!(usize))
                .default_value("4"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-q --"quiet" "Suppress the banner and progress output")
                .required(false),
        )
}
