mod helpers;

use helpers::arc;
use proptest::prelude::*;
use worldex::{CanonicalStore, FetchMode, Reconciler};
use worldex_mock::{MockSource, fixtures};

const NAMES: [&str; 4] = ["s0", "s1", "s2", "s3"];

fn build(values: &[f64], mode: FetchMode) -> Reconciler {
    let mut b = Reconciler::builder().fetch_mode(mode).cutoff_year(2025);
    for (name, v) in NAMES.iter().zip(values) {
        let payload = fixtures::payload(vec![fixtures::row("FRA", "population", *v, "2024")]);
        b = b.with_source(arc(MockSource::returning(*name, payload)));
    }
    b.build().unwrap()
}

proptest! {
    #[test]
    fn first_registered_source_wins_regardless_of_fetch_mode(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..=4),
        concurrent in any::<bool>(),
    ) {
        let mode = if concurrent { FetchMode::Concurrent } else { FetchMode::Sequential };
        let r = build(&values, mode);
        let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let mut store = CanonicalStore::new();
        let report = rt.block_on(r.reconcile(&mut store));

        let got = store.field("FRA", "population").map(|o| o.value);
        prop_assert_eq!(got, Some(values[0]));
        prop_assert_eq!(report.fields_added(), 1);
    }
}
