//! Property tests for the backup artifact

use follow_migrator::data::Completion;
use follow_migrator::{BackupRecord, BackupStore, FileBackupStore, RelationshipId};
use proptest::prelude::*;
use tempfile::TempDir;

fn id_list() -> impl Strategy<Value = Vec<RelationshipId>> {
    proptest::collection::hash_set("[1-9][0-9]{0,9}", 0..40)
        .prop_map(|set| set.into_iter().map(RelationshipId::new).collect())
}

fn record() -> impl Strategy<Value = BackupRecord> {
    (id_list(), id_list(), any::<bool>(), any::<bool>()).prop_map(
        |(public_followers, private_followers, public, private)| BackupRecord {
            public_followers,
            private_followers,
            done: Completion { public, private },
        },
    )
}

proptest! {
    #[test]
    fn saved_record_loads_back_unchanged(record in record()) {
        let dir = TempDir::new().unwrap();
        let store = FileBackupStore::new(dir.path().join("backup.json"), true);

        store.save(&record).unwrap();
        prop_assert_eq!(store.load().unwrap(), record);
    }
}
