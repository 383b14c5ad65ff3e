//! Properties that must hold for every host list, checked against a fixed collection of inputs
//! that cover mixed prefixes, mixed widths, duplicates and overlapping ranges.

use std::collections::BTreeSet;

use hostlist::{HostList, HostSet};

const SAMPLES: &[&str] = &[
    "",
    "server",
    "a[1-3,5]",
    "node[08-12],node[1-3],login",
    "r1,r2,r3,r3",
    "x,n[1-5],x,n[3-9],n02",
    "rack[1-2]_node[0-3]",
    "gpu[001-004].ib,gpu[003-006].ib",
    "c[10-20],c[5-15],c[1-3]",
    "n[8-12],n[008-012],n[98-102]",
    "z9,z10,z09,z010,z[1-2]",
    "node[001-128],node[95-105],node100",
    "n[98-102],n091,n100,n[97-105]",
];

fn hosts(list: &HostList) -> Vec<String> {
    list.iter().collect()
}

fn distinct(list: &HostList) -> BTreeSet<String> {
    list.iter().collect()
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[test]
fn ranged_string_reparses_to_same_hosts() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();
        let reparsed = HostList::parse(&list.ranged_string()).unwrap();

        assert_eq!(hosts(&reparsed), hosts(&list), "{sample}");
    }
}

#[test]
fn deranged_string_lists_every_host() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();
        let deranged = list.deranged_string();

        let names: Vec<String> = if deranged.is_empty() {
            Vec::new()
        } else {
            deranged.split(',').map(str::to_owned).collect()
        };

        assert_eq!(names, hosts(&list), "{sample}");
    }
}

#[test]
fn count_matches_hosts_and_ranges() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();

        let from_ranges: u64 = list.ranges().iter().map(|range| range.count()).sum();

        assert_eq!(list.count(), from_ranges, "{sample}");
        assert_eq!(list.count(), hosts(&list).len() as u64, "{sample}");
    }
}

#[test]
fn sort_keeps_hosts_and_is_idempotent() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();
        let before = sorted(hosts(&list));

        list.sort();
        let once = list.ranged_string();
        assert_eq!(sorted(hosts(&list)), before, "{sample}");

        list.sort();
        assert_eq!(list.ranged_string(), once, "{sample}");
    }
}

#[test]
fn uniq_keeps_each_host_once_and_is_idempotent() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();
        let expected = distinct(&list);

        list.uniq();
        let once = list.ranged_string();

        assert_eq!(list.count(), expected.len() as u64, "{sample}");
        assert_eq!(distinct(&list), expected, "{sample}");

        list.uniq();
        assert_eq!(list.ranged_string(), once, "{sample}");

        let reparsed = HostList::parse(&once).unwrap();
        assert_eq!(reparsed.ranged_string(), once, "{sample}");
    }
}

#[test]
fn set_holds_every_distinct_host() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();
        let set = HostSet::parse(sample).unwrap();

        assert_eq!(set.count(), distinct(&list).len() as u64, "{sample}");
        assert!(set.within(sample).unwrap(), "{sample}");

        for name in distinct(&list) {
            assert!(set.find(&name).is_some(), "{sample}: {name}");
        }
    }
}

#[test]
fn set_iterates_in_position_order() {
    for sample in SAMPLES {
        let set = HostSet::parse(sample).unwrap();

        for (position, name) in set.iter().enumerate() {
            assert_eq!(set.find(&name), Some(position as u64), "{sample}: {name}");
            assert_eq!(set.nth(position as u64).as_deref(), Some(name.as_str()));
        }
    }
}

#[test]
fn iterator_visits_count_hosts() {
    for sample in SAMPLES {
        let list = HostList::parse(sample).unwrap();
        assert_eq!(list.iter().count() as u64, list.count(), "{sample}");
    }
}
