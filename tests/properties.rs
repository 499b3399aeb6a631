//! Property-based tests of the merge algebra: idempotence, commutativity,
//! associativity, and delta soundness, across the register CRDTs.

use deltacrdt::{Crdt, LwwRegister, MvRegister, ReplicaId, Timestamp, VersionVector};
use proptest::prelude::*;

fn replica_id() -> impl Strategy<Value = ReplicaId> {
    prop::sample::select(vec!["a", "b", "c"]).prop_map(ReplicaId::new)
}

fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0..6i32, replica_id()).prop_map(|(cnt, rid)| Timestamp::new(cnt, rid))
}

fn lww_register() -> impl Strategy<Value = LwwRegister<i32>> {
    (any::<i32>(), timestamp()).prop_map(|(value, ts)| LwwRegister::new(value, ts))
}

proptest! {
    #[test]
    fn lww_register_merge_is_idempotent(reg in lww_register(), value in any::<i32>(), ts in timestamp()) {
        let mut base = reg.clone();
        let delta = base.assign(value, ts);

        let mut once = reg.clone();
        once.merge(delta.clone());
        let mut twice = once.clone();
        twice.merge(delta);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn lww_register_merge_is_commutative(
        reg in lww_register(),
        v1 in any::<i32>(), t1 in timestamp(),
        v2 in any::<i32>(), t2 in timestamp(),
    ) {
        let mut source = reg.clone();
        let delta1 = source.assign(v1, t1);
        let mut source2 = reg.clone();
        let delta2 = source2.assign(v2, t2);

        let mut order_a = reg.clone();
        order_a.merge(delta1.clone());
        order_a.merge(delta2.clone());

        let mut order_b = reg.clone();
        order_b.merge(delta2);
        order_b.merge(delta1);

        prop_assert_eq!(order_a, order_b);
    }

    #[test]
    fn lww_register_merge_is_associative(
        reg in lww_register(),
        v1 in any::<i32>(), t1 in timestamp(),
        v2 in any::<i32>(), t2 in timestamp(),
        v3 in any::<i32>(), t3 in timestamp(),
    ) {
        let mut a = reg.clone();
        a.assign(v1, t1);
        let mut b = reg.clone();
        b.assign(v2, t2);
        let mut c = reg.clone();
        c.assign(v3, t3);

        let empty = VersionVector::new();

        // (a join b) join c
        let mut ab = a.clone();
        ab.merge(b.generate_delta(&empty));
        let mut left = ab.clone();
        left.merge(c.generate_delta(&empty));

        // a join (b join c)
        let mut bc = b.clone();
        bc.merge(c.generate_delta(&empty));
        let mut right = a.clone();
        right.merge(bc.generate_delta(&empty));

        prop_assert_eq!(left, right);
    }

    #[test]
    fn lww_register_delta_is_sound(reg in lww_register(), value in any::<i32>(), ts in timestamp()) {
        let mut full = reg.clone();
        let delta = full.assign(value, ts);

        let vv = VersionVector::new();
        let generated = full.generate_delta(&vv);

        let mut via_delta = reg.clone();
        via_delta.merge(delta);

        let mut via_generated = reg.clone();
        via_generated.merge(generated);

        prop_assert_eq!(via_delta, full.clone());
        prop_assert_eq!(via_generated, full);
    }

    #[test]
    fn mv_register_merge_is_idempotent(
        values in prop::collection::vec((any::<i32>(), timestamp()), 0..4),
    ) {
        let mut base = MvRegister::new();
        for (v, t) in &values {
            base.assign(*v, t.clone());
        }
        let delta = base.generate_delta(&VersionVector::new());

        let mut once = MvRegister::new();
        once.merge(delta.clone());
        let mut twice = once.clone();
        twice.merge(delta);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn mv_register_merge_is_commutative(
        v1 in any::<i32>(), t1 in timestamp(),
        v2 in any::<i32>(), t2 in timestamp(),
    ) {
        let mut s1 = MvRegister::new();
        let d1 = s1.assign(v1, t1);
        let mut s2 = MvRegister::new();
        let d2 = s2.assign(v2, t2);

        let mut order_a = MvRegister::new();
        order_a.merge(d1.clone());
        order_a.merge(d2.clone());

        let mut order_b = MvRegister::new();
        order_b.merge(d2);
        order_b.merge(d1);

        prop_assert_eq!(order_a, order_b);
    }

    #[test]
    fn mv_register_delta_is_sound(v in any::<i32>(), t in timestamp()) {
        let mut full = MvRegister::new();
        full.assign(v, t);

        let vv = VersionVector::new();
        let generated = full.generate_delta(&vv);

        let mut via_generated = MvRegister::new();
        via_generated.merge(generated);

        prop_assert_eq!(via_generated, full);
    }
}
