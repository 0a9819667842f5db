//! End-to-end integration tests for VaultDB.
//!
//! These tests drive the engine through its statement interface the way a
//! shell would, and check the storage and capability properties underneath.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vault_cap::{CapabilityManager, ObjectType, Rights};
use vault_common::config::CapabilityConfig;
use vault_common::platform::ManualClock;
use vault_common::types::{CapId, ProcessId, RowId, TableId};
use vault_common::ErrorCode;
use vault_server::database::{AUDIT_TABLE, OBJECT_TABLE};
use vault_server::QueryResult;
use vault_storage::btree::BTree;
use vault_storage::crypto::{self, MasterKey};
use vault_storage::{FieldValue, Record};
use vault_test::utils::TestEngine;
use vault_test::workload;

const KERNEL: ProcessId = ProcessId::KERNEL;

fn ok(result: QueryResult) -> QueryResult {
    assert!(result.is_ok(), "statement failed: {result}");
    result
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_insert_and_select_by_key() {
    let t = TestEngine::new();
    t.create_t();

    ok(t.engine.execute("INSERT INTO T (id, name) VALUES (1, 'alice')", KERNEL));
    let result = ok(t.engine.execute("SELECT * FROM T WHERE id = 1", KERNEL));

    let rows = result.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.value(0, "id"), Some(&FieldValue::U64(1)));
    assert_eq!(rows.value(0, "name"), Some(&FieldValue::Str("alice".into())));
}

#[test]
fn test_grant_then_revoke_cascades() {
    let t = TestEngine::new();

    let result = ok(t.engine.execute("GRANT READ ON 42 TO 7", KERNEL));
    let text = result.message().unwrap();
    let cap_id: u64 = text
        .rsplit("cap_id=")
        .next()
        .and_then(|s| s.trim_end_matches(')').parse().ok())
        .unwrap();
    let root = CapId::new(cap_id);
    assert!(t.engine.check(ProcessId::new(7), 42, Rights::READ));

    // Capabilities derived from it, two levels deep.
    let alice = ProcessId::new(7);
    let bob = ProcessId::new(8);
    let carol = ProcessId::new(9);
    let granting = t
        .engine
        .create_capability(42, ObjectType::Table, alice, Rights::READ | Rights::GRANT)
        .unwrap();
    let child = t.engine.grant(alice, granting, bob, Rights::READ | Rights::GRANT).unwrap();
    let grandchild = t.engine.grant(bob, child, carol, Rights::READ).unwrap();

    ok(t.engine.execute(&format!("REVOKE {root}"), KERNEL));
    assert!(t.engine.capability(root).unwrap().revoked);
    // A sibling root and its subtree are untouched.
    assert!(t.engine.validate(grandchild).is_ok());

    let result = ok(t.engine.execute(&format!("REVOKE {granting}"), KERNEL));
    assert_eq!(
        result.message(),
        Some(format!("Capability {granting} revoked (cascade)").as_str())
    );
    for cap in [granting, child, grandchild] {
        assert_eq!(t.engine.validate(cap).unwrap_err().code(), ErrorCode::CapRevoked);
    }
    assert!(!t.engine.check(carol, 42, Rights::READ));
}

#[test]
fn test_corrupted_mac_hides_row() {
    let t = TestEngine::new();
    let table = t.create_t();
    for sql in workload::insert_statements("T", 5) {
        ok(t.engine.execute(&sql, KERNEL));
    }

    let victim = t.engine.with_storage(|storage| {
        let mut first = None;
        let _ = storage.scan(table, |record| {
            first = Some(record.row_id);
            ControlFlow::Break(())
        });
        let row_id = first.unwrap();
        storage.envelope_mut(table, row_id).unwrap().mac[31] ^= 0x80;
        row_id
    });

    let result = ok(t.engine.execute("SELECT * FROM T", KERNEL));
    assert_eq!(result.row_count(), 4);
    assert!(t.engine.with_storage(|s| s.get(table, victim).unwrap()).is_none());
}

#[test]
fn test_delete_then_select_is_empty() {
    let t = TestEngine::new();
    t.create_t();
    ok(t.engine.execute("INSERT INTO T (id, name) VALUES (1, 'alice')", KERNEL));

    let result = ok(t.engine.execute("DELETE FROM T WHERE name = 'alice'", KERNEL));
    assert_eq!(result.message(), Some("1 row(s) deleted"));
    assert_eq!(ok(t.engine.execute("SELECT * FROM T", KERNEL)).row_count(), 0);
}

#[test]
fn test_update_reseals_with_fresh_iv() {
    let t = TestEngine::new();
    let table = t.create_t();
    ok(t.engine.execute("INSERT INTO T (id, name) VALUES (1, 'alice')", KERNEL));

    let row_id = RowId::new(4);
    let before = t.engine.with_storage(|s| s.envelope(table, row_id).cloned().unwrap());
    ok(t.engine.execute("UPDATE T SET name = 'bob' WHERE id = 1", KERNEL));
    let after = t.engine.with_storage(|s| s.envelope(table, row_id).cloned().unwrap());

    assert_ne!(before.iv, after.iv);
    assert_ne!(before.ciphertext, after.ciphertext);
    let result = ok(t.engine.execute("SELECT name FROM T", KERNEL));
    assert_eq!(result.rows().unwrap().rows, vec![vec![FieldValue::Str("bob".into())]]);
}

// =========================================================================
// Authorization
// =========================================================================

#[test]
fn test_user_process_lifecycle() {
    let t = TestEngine::new();
    let alice = ProcessId::new(7);
    let bob = ProcessId::new(8);
    let object = OBJECT_TABLE.object_id();

    // Without capabilities the table is invisible.
    assert_eq!(
        t.engine.execute("SELECT * FROM ObjectTable", alice).code(),
        ErrorCode::PermissionDenied
    );

    ok(t.engine.execute(&format!("GRANT ALL ON {object} TO 7"), KERNEL));
    ok(t.engine.execute(
        "INSERT INTO ObjectTable (name, type, data) VALUES ('diary', 'file', 'dear diary')",
        alice,
    ));

    // Alice shares read access with Bob; Bob cannot write.
    ok(t.engine.execute(&format!("GRANT READ ON {object} TO 8"), alice));
    let result = ok(t.engine.execute("SELECT name, size FROM ObjectTable", bob));
    assert_eq!(
        result.rows().unwrap().rows,
        vec![vec![FieldValue::Str("diary".into()), FieldValue::U64(10)]]
    );
    assert_eq!(
        t.engine
            .execute("UPDATE ObjectTable SET data = 'x'", bob)
            .code(),
        ErrorCode::PermissionDenied
    );

    // Bob may not revoke Alice's capability, but the kernel may.
    let alice_cap = t
        .engine
        .capability(CapId::new(2))
        .filter(|cap| cap.owner_pid == alice)
        .unwrap();
    assert_eq!(
        t.engine
            .execute(&format!("REVOKE {}", alice_cap.cap_id), bob)
            .code(),
        ErrorCode::PermissionDenied
    );
    ok(t.engine.execute(&format!("REVOKE {}", alice_cap.cap_id), KERNEL));
    assert_eq!(
        t.engine.execute("SELECT * FROM ObjectTable", bob).code(),
        ErrorCode::PermissionDenied
    );
}

#[test]
fn test_audit_trail_records_mutations() {
    let t = TestEngine::new();
    t.create_t();
    t.clock.set(1_000);

    ok(t.engine.execute("INSERT INTO T (id, name) VALUES (1, 'a')", KERNEL));
    ok(t.engine.execute("GRANT READ ON 6 TO 7", KERNEL));
    ok(t.engine.execute("DELETE FROM T", KERNEL));

    let mut actions = Vec::new();
    t.engine.with_storage(|storage| {
        let _ = storage.scan(AUDIT_TABLE, |record| {
            assert_eq!(record.fields[1], FieldValue::U64(1_000));
            actions.push(record.fields[3].as_str().unwrap_or_default().to_string());
            ControlFlow::<()>::Continue(())
        });
    });
    assert_eq!(actions, ["INSERT", "GRANT", "DELETE"]);
}

#[test]
fn test_shared_engine_across_threads() {
    let t = Arc::new(TestEngine::new());
    t.create_t();

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for i in 0..25u64 {
                    let id = worker * 100 + i;
                    let sql = format!("INSERT INTO T (id, name) VALUES ({id}, 'w{worker}')");
                    assert!(t.engine.execute(&sql, KERNEL).is_ok());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ok(t.engine.execute("SELECT id FROM T", KERNEL)).row_count(), 100);
    let result = ok(t.engine.execute("SELECT id FROM T WHERE name = 'w2'", KERNEL));
    assert_eq!(result.row_count(), 25);
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn test_seal_open_round_trip() {
    let keys = MasterKey::from_bytes([9; 32]).derive(TableId::new(3)).unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    for i in 0..64u64 {
        let name = workload::random_string(&mut rng, (i as usize * 4) % 255);
        let blob: Vec<u8> = (0..(i as usize * 31) % 2048).map(|_| rng.gen()).collect();
        let record = Record::new(
            RowId::new(i + 1),
            TableId::new(3),
            vec![
                FieldValue::U64(rng.gen()),
                FieldValue::I64(rng.gen()),
                FieldValue::Str(name),
                FieldValue::Blob(blob),
                FieldValue::Bool(i % 2 == 0),
                FieldValue::U32(rng.gen()),
                FieldValue::U8(rng.gen()),
            ],
        );
        let envelope = crypto::seal(&keys, &record, true, &mut rng).unwrap();
        assert_eq!(crypto::open(&keys, &envelope, true).unwrap(), record);
    }
}

#[test]
fn test_any_flipped_bit_fails_closed() {
    let keys = MasterKey::from_bytes([1; 32]).derive(TableId::new(0)).unwrap();
    let mut rng = StdRng::seed_from_u64(6);
    let record = Record::new(
        RowId::new(1),
        TableId::new(0),
        vec![FieldValue::U64(1), FieldValue::Str("confidential".into())],
    );
    let envelope = crypto::seal(&keys, &record, true, &mut rng).unwrap();

    for byte in 0..envelope.ciphertext.len() {
        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered.ciphertext[byte] ^= 1 << bit;
            assert!(crypto::open(&keys, &tampered, true).is_err());
        }
    }
    for byte in 0..envelope.mac.len() {
        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered.mac[byte] ^= 1 << bit;
            assert!(crypto::open(&keys, &tampered, true).is_err());
        }
    }
    for byte in 0..envelope.iv.len() {
        let mut tampered = envelope.clone();
        tampered.iv[byte] ^= 0x01;
        assert!(crypto::open(&keys, &tampered, true).is_err());
    }
}

#[test]
fn test_derived_rights_never_exceed_parent() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut caps = CapabilityManager::new(
        CapabilityConfig::default(),
        &mut rng,
        Arc::new(ManualClock::new(0)),
    )
    .unwrap();

    let owner = ProcessId::new(1);
    for _ in 0..200 {
        let parent_rights = Rights::from_bits_truncate(rng.gen::<u32>()) | Rights::GRANT;
        let requested = Rights::from_bits_truncate(rng.gen::<u32>());
        let parent = caps
            .create(5, ObjectType::Table, owner, parent_rights, CapId::NONE)
            .unwrap();
        let child = caps.grant(owner, parent, ProcessId::new(2), requested).unwrap();

        let child_rights = caps.get(child).unwrap().rights;
        assert!((child_rights & !parent_rights).is_empty());
        assert_eq!(child_rights, requested & parent_rights);
    }
}

#[test]
fn test_revoke_reaches_exactly_the_subtree() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut caps = CapabilityManager::new(
        CapabilityConfig::default(),
        &mut rng,
        Arc::new(ManualClock::new(0)),
    )
    .unwrap();

    // A random forest: each node is owned by its own pid so any node can grant.
    let mut nodes: Vec<(CapId, Option<usize>)> = Vec::new();
    for i in 0..60usize {
        let pid = ProcessId::new(i as u64 + 1);
        let parent = if nodes.is_empty() || rng.gen_bool(0.2) {
            None
        } else {
            Some(rng.gen_range(0..nodes.len()))
        };
        let cap = match parent {
            None => caps
                .create(1, ObjectType::Table, pid, Rights::ALL, CapId::NONE)
                .unwrap(),
            Some(p) => {
                let (parent_cap, _) = nodes[p];
                let parent_owner = caps.get(parent_cap).unwrap().owner_pid;
                let child = caps
                    .grant(parent_owner, parent_cap, parent_owner, Rights::ALL)
                    .unwrap();
                caps.delegate(parent_owner, child, pid).unwrap();
                child
            }
        };
        nodes.push((cap, parent));
    }

    let target = 3.min(nodes.len() - 1);
    let mut expected = HashSet::from([target]);
    // Children always come after their parent, so one pass suffices.
    for (i, &(_, parent)) in nodes.iter().enumerate() {
        if parent.is_some_and(|p| expected.contains(&p)) {
            expected.insert(i);
        }
    }

    let revoked = caps.revoke(KERNEL, nodes[target].0).unwrap();
    assert_eq!(revoked, expected.len());
    for (i, &(cap, _)) in nodes.iter().enumerate() {
        assert_eq!(caps.get(cap).unwrap().revoked, expected.contains(&i), "node {i}");
    }
}

#[test]
fn test_btree_scan_stays_sorted() {
    let mut tree = BTree::new(4).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let mut model = std::collections::BTreeSet::new();

    for round in 0..2_000 {
        let key = rng.gen_range(0..300u64);
        if rng.gen_bool(0.6) {
            tree.insert(key, round);
            model.insert(key);
        } else {
            tree.delete(key);
            model.remove(&key);
        }
    }

    let keys: Vec<u64> = tree.iter().map(|(k, _)| k).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(keys, model.into_iter().collect::<Vec<_>>());
    assert_eq!(tree.len(), keys.len());
}

#[test]
fn test_select_is_idempotent() {
    let t = TestEngine::with_seed(3);
    t.create_t();
    for sql in workload::insert_statements("T", 40) {
        ok(t.engine.execute(&sql, KERNEL));
    }

    let first = ok(t.engine.execute("SELECT * FROM T WHERE id > 10", KERNEL));
    let second = ok(t.engine.execute("SELECT * FROM T WHERE id > 10", KERNEL));
    assert_eq!(first, second);
    assert_eq!(first.row_count(), 30);
}
