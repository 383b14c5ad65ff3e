//! End-to-end scenarios for parsing, modifying and rendering host lists through the public API.

use hostlist::{Error, HostList, HostListConfig, HostSet};

fn torus() -> HostListConfig {
    HostListConfig::builder().dimensions(3).build()
}

#[test]
fn bracket_group_expands_and_compresses() {
    let hosts = HostList::parse("a[1-3,5]").unwrap();

    assert_eq!(hosts.count(), 4);
    assert_eq!(hosts.deranged_string(), "a1,a2,a3,a5");
    assert_eq!(hosts.ranged_string(), "a[1-3,5]");
}

#[test]
fn padded_range_round_trips() {
    let hosts = HostList::parse("node[08-12]").unwrap();

    assert_eq!(hosts.ranged_string(), "node[08-12]");
    assert_eq!(hosts.nth(0).as_deref(), Some("node08"));
    assert_eq!(hosts.nth(4).as_deref(), Some("node12"));
}

#[test]
fn unpadded_range_keeps_natural_widths() {
    let hosts = HostList::parse("node[8-12]").unwrap();

    assert_eq!(hosts.ranged_string(), "node[8-12]");
    assert_eq!(
        hosts.deranged_string(),
        "node8,node9,node10,node11,node12"
    );
}

#[test]
fn delete_splits_range() {
    let hosts = HostList::parse("f[0-5]").unwrap();

    assert_eq!(hosts.delete("f[1-3]").unwrap(), 3);
    assert_eq!(hosts.deranged_string(), "f0,f4,f5");
    assert_eq!(hosts.ranged_string(), "f[0,4-5]");
    assert_eq!(hosts.count(), 3);
}

#[test]
fn torus_box_expands_innermost_axis_first() {
    let hosts = HostList::parse_with_config("bg[012x123]", torus()).unwrap();

    assert_eq!(
        hosts.iter().collect::<Vec<_>>(),
        ["bg012", "bg013", "bg022", "bg023", "bg112", "bg113", "bg122", "bg123"]
    );
    assert_eq!(hosts.ranged_string(), "bg[012x123]");
}

#[test]
fn torus_hosts_render_as_box() {
    let hosts = HostList::parse_with_config(
        "bg012,bg013,bg022,bg023,bg112,bg113,bg122,bg123",
        torus(),
    )
    .unwrap();

    assert_eq!(hosts.ranged_string(), "bg[012x123]");
}

#[test]
fn uniq_drops_duplicate() {
    let hosts = HostList::parse("r1,r2,r3,r3").unwrap();
    assert_eq!(hosts.count(), 4);

    hosts.uniq();

    assert_eq!(hosts.ranged_string(), "r[1-3]");
    assert_eq!(hosts.count(), 3);
}

#[test]
fn different_prefixes_stay_separate() {
    let hosts = HostList::parse("a[0-1],b[0-1]").unwrap();
    assert_eq!(hosts.ranged_string(), "a[0-1],b[0-1]");
}

#[test]
fn empty_string_is_empty_list() {
    let hosts = HostList::parse("").unwrap();

    assert!(hosts.is_empty());
    assert_eq!(hosts.count(), 0);
    assert_eq!(hosts.ranged_string(), "");
    assert_eq!(hosts.iter().next(), None);
}

#[test]
fn plain_name_round_trips() {
    let hosts = HostList::parse("server").unwrap();

    assert_eq!(hosts.count(), 1);
    assert_eq!(hosts.ranged_string(), "server");
    assert_eq!(hosts.find("server"), Some(0));
}

#[test]
fn list_keeps_insertion_order_until_sorted() {
    let hosts = HostList::parse("n3,login,n1,n2").unwrap();
    assert_eq!(hosts.ranged_string(), "n3,login,n[1-2]");

    hosts.sort();
    assert_eq!(hosts.ranged_string(), "login,n[1-3]");
}

#[test]
fn padded_range_past_hundred_stays_one_item() {
    let hosts = HostList::parse("node[001-128]").unwrap();

    hosts.sort();
    assert_eq!(hosts.ranged_string(), "node[001-128]");

    hosts.uniq();
    assert_eq!(hosts.ranged_string(), "node[001-128]");
    assert_eq!(hosts.count(), 128);

    let set = HostSet::parse("node[001-128]").unwrap();
    assert_eq!(set.ranged_string(), "node[001-128]");
    assert_eq!(set.find("node100"), Some(99));
    assert_eq!(set.find("node0100"), None);
}

#[test]
fn set_merges_on_insert() {
    let set = HostSet::parse("n[1-4]").unwrap();

    assert_eq!(set.insert("n[3-8],n1").unwrap(), 4);
    assert_eq!(set.ranged_string(), "n[1-8]");
    assert!(set.within("n[2-7]").unwrap());
}

#[test]
fn invalid_input_is_rejected() {
    assert!(matches!(
        HostList::parse("node[1-"),
        Err(Error::InvalidBrackets { .. })
    ));
    assert!(matches!(
        HostList::parse("node[5-3]"),
        Err(Error::InvalidRange { .. })
    ));
    assert!(matches!(
        HostList::parse("node[0-99999999]"),
        Err(Error::RangeTooLarge { .. })
    ));
    assert!(matches!(
        HostList::parse("node[99999999999999999999]"),
        Err(Error::NumberTooLarge { .. })
    ));
}

#[test]
fn fixed_buffer_output() {
    let hosts = HostList::parse("a[1-3,5]").unwrap();

    let mut buf = [0_u8; 16];
    assert_eq!(hosts.write_ranged(&mut buf).unwrap(), 8);
    assert_eq!(buf.get(..9), Some(&b"a[1-3,5]\0"[..]));

    let mut small = [0_u8; 4];
    assert!(matches!(
        hosts.write_ranged(&mut small),
        Err(Error::Truncated {
            required: 9,
            available: 4
        })
    ));
    assert_eq!(&small, b"a[1\0");
}
