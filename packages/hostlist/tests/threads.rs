//! Host lists and sets shared between threads.

use std::thread;

use hostlist::{HostList, HostSet};

const THREADS: u64 = 4;
const HOSTS_PER_THREAD: u64 = 250;

#[test]
fn concurrent_pushes_are_all_kept() {
    let list = HostList::new();

    thread::scope(|s| {
        for t in 0..THREADS {
            let list = &list;
            s.spawn(move || {
                for i in 0..HOSTS_PER_THREAD {
                    list.push_host(&format!("t{t}n{i}")).unwrap();
                }
            });
        }
    });

    assert_eq!(list.count(), THREADS * HOSTS_PER_THREAD);

    list.sort();
    assert_eq!(list.ranged_string(), "t0n[0-249],t1n[0-249],t2n[0-249],t3n[0-249]");
}

#[test]
fn concurrent_set_inserts_form_union() {
    let set = HostSet::new();

    thread::scope(|s| {
        for t in 0..THREADS {
            let set = &set;
            s.spawn(move || {
                // Every thread covers an overlapping window of node numbers.
                let lo = t * 100;
                let hi = lo + 199;
                for n in lo..=hi {
                    set.insert(&format!("node{n}")).unwrap();
                }
            });
        }
    });

    assert_eq!(set.count(), 500);
    assert_eq!(set.ranged_string(), "node[0-499]");
}

#[test]
fn iteration_survives_concurrent_deletion() {
    let list = HostList::parse("n[0-999]").unwrap();

    let visited = thread::scope(|s| {
        let reader = s.spawn(|| list.iter().count());

        s.spawn(|| {
            for n in (0..1000).step_by(2) {
                assert!(list.delete_host(&format!("n{n}")));
            }
        });

        reader.join().unwrap()
    });

    // The reader sees every odd host plus whichever even hosts it passed before they went.
    assert!((500..=1000).contains(&visited));
    assert_eq!(list.count(), 500);
    assert_eq!(list.nth(0).as_deref(), Some("n1"));
}

#[test]
fn concurrent_shift_hands_out_each_host_once() {
    let list = HostList::parse("n[0-399]").unwrap();

    let taken: Vec<String> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    let mut mine = Vec::new();
                    while let Some(host) = list.shift() {
                        mine.push(host);
                    }
                    mine
                })
            })
            .collect();

        workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect()
    });

    assert!(list.is_empty());
    assert_eq!(taken.len(), 400);

    let mut numbers: Vec<u64> = taken
        .iter()
        .map(|host| host.trim_start_matches('n').parse().unwrap())
        .collect();
    numbers.sort_unstable();
    assert!(numbers.into_iter().eq(0..400));
}
