//! Walks through the main host list operations: parsing, sorting, set insertion and rendering
//! of a multi-dimensional torus.
//!
//! The rejected input at the end shows the parser's debug diagnostics.

use hostlist::{HostList, HostListConfig, HostSet};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Host list ===");

    let hosts = HostList::parse("node[1-3],login,node[4-6],gpu[001-004]").unwrap();
    println!("Parsed {} hosts: {hosts}", hosts.count());

    hosts.sort();
    println!("Sorted: {hosts}");
    println!("Every host: {}", hosts.deranged_string());

    let mut iter = hosts.iter();
    while let Some(host) = iter.next() {
        if host.starts_with("gpu") {
            iter.remove();
        }
    }
    drop(iter);
    println!("Without GPUs: {hosts}");

    println!("=== Host set ===");

    let set = HostSet::parse("node[5-8]").unwrap();
    let added = set.insert("node[1-6],login").unwrap();
    println!("Added {added} new hosts: {set}");
    println!("Contains node[2-3]: {}", set.within("node[2-3]").unwrap());

    println!("=== Torus ===");

    let config = HostListConfig::builder().dimensions(3).build();
    let torus = HostList::parse_with_config("bg[000x011],bg100", config).unwrap();
    println!("{} hosts rendered as: {torus}", torus.count());

    println!("=== Invalid input ===");

    match HostList::parse("node[1-") {
        Ok(list) => println!("Unexpectedly parsed: {list}"),
        Err(error) => println!("Rejected: {error}"),
    }
}
