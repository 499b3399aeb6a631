//! The concrete convergence scenarios a delta-state CRDT core is expected
//! to satisfy: each test drives two or more simulated replicas through a
//! sequence of local updates and deltas and checks they converge.

use deltacrdt::{
    Crdt, JsmRegister, LwwMap, LwwRegister, MvMap, MvRegister, ReplicaId, Timestamp, TypeTag,
    VersionVector,
};

fn ts(cnt: i32, rid: &str) -> Timestamp {
    Timestamp::new(cnt, ReplicaId::new(rid))
}

#[test]
fn lww_register_wins_by_timestamp() {
    let mut r1 = LwwRegister::new("A", ts(1, "a"));
    let mut r2 = LwwRegister::new("B", ts(1, "b"));

    let delta_from_r1 = r1.generate_delta(&VersionVector::new());
    let delta_from_r2 = r2.generate_delta(&VersionVector::new());
    r1.merge(delta_from_r2);
    r2.merge(delta_from_r1);

    assert_eq!(*r1.get(), "B");
    assert_eq!(*r2.get(), "B");
}

#[test]
fn lww_map_put_then_delete_converges_to_absent() {
    let mut replica = LwwMap::new();
    replica.put_string("k", "v", ts(1, "a"));
    let delete_delta = replica.delete("k", TypeTag::Str, ts(2, "a"));
    assert_eq!(replica.get_string("k"), None);

    let mut peer = LwwMap::new();
    peer.put_string("k", "v", ts(1, "a"));
    peer.merge(delete_delta);
    assert_eq!(peer.get_string("k"), None);
}

#[test]
fn mv_register_concurrent_assigns_are_both_kept() {
    let mut r1 = MvRegister::new();
    let mut r2 = MvRegister::new();
    let delta1 = r1.assign("X", ts(1, "a"));
    let delta2 = r2.assign("Y", ts(1, "b"));
    r1.merge(delta2);
    r2.merge(delta1);

    let mut values = r1.get();
    values.sort_unstable();
    assert_eq!(values, vec!["X", "Y"]);
    assert_eq!(r1.causal_context().counter(&ReplicaId::new("a")), 1);
    assert_eq!(r1.causal_context().counter(&ReplicaId::new("b")), 1);
    assert_eq!(r1, r2);
}

#[test]
fn mv_map_tombstone_is_absorbed_by_a_concurrent_write() {
    let mut r1 = MvMap::new();
    r1.put_string("k", "V", ts(1, "a"));
    let delete_delta = r1.delete("k", TypeTag::Str, ts(2, "a"));

    let mut r2 = MvMap::new();
    let put_delta = r2.put_string("k", "W", ts(1, "b"));

    r1.merge(put_delta);
    r2.merge(delete_delta);

    use deltacrdt::PrimitiveValue;
    assert_eq!(r2.get("k", TypeTag::Str), Some(vec![PrimitiveValue::Str("W".to_string())]));
    assert_eq!(r1.get("k", TypeTag::Str), Some(vec![PrimitiveValue::Str("W".to_string())]));
}

#[test]
fn jsm_register_takes_the_max_of_every_assignment() {
    let mut reg = JsmRegister::new(42);
    reg.assign(3);
    assert_eq!(*reg.get(), 42);
    reg.assign(100);
    assert_eq!(*reg.get(), 100);
}

#[test]
fn delta_generation_filters_by_version_vector() {
    let mut replica = LwwMap::new();
    replica.put_string("k1", "v", ts(1, "a"));
    replica.put_string("k2", "v", ts(2, "a"));
    replica.put_string("k3", "v", ts(3, "a"));
    replica.put_string("k4", "v", ts(4, "a"));

    let mut vv = VersionVector::new();
    vv.add(&ts(2, "a"));

    let delta = replica.generate_delta(&vv);

    let mut fresh = LwwMap::new();
    fresh.merge(delta);

    assert_eq!(fresh.get_string("k1"), None);
    assert_eq!(fresh.get_string("k2"), None);
    assert_eq!(fresh.get_string("k3"), Some("v".to_string()));
    assert_eq!(fresh.get_string("k4"), Some("v".to_string()));
}

#[test]
fn json_round_trip_holds_across_every_crdt_kind() {
    let lww = LwwRegister::new(42, ts(3, "a"));
    assert_eq!(LwwRegister::from_json(&lww.to_json()).unwrap(), lww);

    let mut mv = MvRegister::new();
    mv.assign("X".to_string(), ts(1, "a"));
    assert_eq!(MvRegister::from_json(&mv.to_json()).unwrap(), mv);

    let mut lmap = LwwMap::new();
    lmap.put_i32("n", 5, ts(1, "a"));
    assert_eq!(LwwMap::from_json(&lmap.to_json()).unwrap(), lmap);

    let mut mmap = MvMap::new();
    mmap.put_bool("flag", true, ts(1, "a"));
    assert_eq!(MvMap::from_json(&mmap.to_json()).unwrap(), mmap);

    let jsm = JsmRegister::new(7);
    assert_eq!(JsmRegister::from_json(&jsm.to_json()).unwrap(), jsm);

    let mut imm = deltacrdt::Immutable::new();
    imm.set(9);
    assert_eq!(deltacrdt::Immutable::from_json(&imm.to_json()).unwrap(), imm);
}
