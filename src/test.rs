#[cfg(test)]
mod tests {
    use crate::{
        Error, ExpressionErrorKind, Finder, Operation, StorageConfig, Store,
        fs::{Entry, LocalStorage, MemoryStorage, Storage},
    };
    use chrono::{TimeZone as _, Utc};
    use filetime::{FileTime, set_file_mtime};
    use std::fs;
    use tempfile::TempDir;

    /// `cache/` with three 9 byte txt files and two 24 byte php files
    fn cache_fixture() -> (TempDir, Store<LocalStorage>) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Store::local(StorageConfig::new(dir.path())).expect("Failed to open store");
        for name in ["file1.txt", "file2.txt", "file3.txt"] {
            store
                .put(&format!("cache/{name}"), b"123456789")
                .expect("Failed to write txt fixture");
        }
        for name in ["file1.php", "file2.php"] {
            store
                .put(&format!("cache/{name}"), b"<?php echo 'hello'; ?>\n\n")
                .expect("Failed to write php fixture");
        }
        (dir, store)
    }

    fn names(finder: &Finder<'_, LocalStorage>) -> Vec<String> {
        finder.iter().map(|entry| entry.file_name().to_owned()).collect()
    }

    #[test]
    fn only_keeps_listed_extensions() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").only(["txt"]);
        assert_eq!(finder.get().unwrap().len(), 3);
        assert!(finder.iter().all(|entry| entry.extension() == "txt"));
    }

    #[test]
    fn except_drops_listed_extensions() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").except(["txt"]);
        assert_eq!(finder.get().unwrap().len(), 2);
        assert_eq!(names(&finder), ["file1.php", "file2.php"]);
    }

    #[test]
    fn size_filter_on_files() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").files().size("< 25");
        assert_eq!(finder.get().unwrap().len(), 5);

        let mut finder = store.find().within("cache").files().size(["> 10", "< 25"]);
        assert_eq!(finder.get().unwrap().len(), 2);

        let mut finder = store.find().within("cache").files().size("== 9");
        assert_eq!(finder.get().unwrap().len(), 3);
    }

    #[test]
    fn date_filter_on_fresh_files() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").files().date("after 2021-01-01");
        assert_eq!(finder.get().unwrap().len(), 5);

        let mut finder = store.find().within("cache").files().date("before 2021-01-01");
        assert_eq!(finder.get().unwrap().len(), 0);
        assert!(!finder.has_results());
    }

    #[test]
    fn pinned_modification_times() {
        let (dir, store) = cache_fixture();
        let old = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap().timestamp();
        set_file_mtime(
            dir.path().join("cache/file2.txt"),
            FileTime::from_unix_time(old, 0),
        )
        .unwrap();

        let mut recent = store.find().within("cache").files().date("after 2021-01-01");
        recent.get().unwrap();
        assert_eq!(recent.count(), 4);

        let mut between = store
            .find()
            .within("cache")
            .date([">= 2020-01-01", "< 2021-01-01"]);
        between.get().unwrap();
        assert_eq!(names(&between), ["file2.txt"]);

        let now = Utc.with_ymd_and_hms(2020, 6, 15, 0, 0, 0).unwrap();
        let mut relative = store.find().within("cache").date("<= 1 week");
        relative.get_at(now).unwrap();
        assert_eq!(names(&relative), ["file2.txt"]);
    }

    #[test]
    fn invalid_date_raises_before_results() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").date("foo");
        let err = finder.get().unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)), "{err}");
        assert_eq!(finder.count(), 0);
        assert!(finder.iter().next().is_none());
    }

    #[test]
    fn unsupported_size_unit() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").files().size("< 3 tb");
        let err = finder.get().unwrap_err();
        assert!(err.as_expression_error().unwrap().is_unsupported_unit());
    }

    #[test]
    fn size_needs_a_file_restriction() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").size("< 25");
        let err = finder.get().unwrap_err();
        assert_eq!(
            err.as_expression_error().unwrap().kind(),
            &ExpressionErrorKind::SizeRequiresFiles
        );
    }

    #[test]
    fn sort_by_name_ignores_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::local(StorageConfig::new(dir.path())).unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            store.put(&format!("sorted/{name}"), name.as_bytes()).unwrap();
        }
        let mut finder = store.find().within("sorted");
        finder.get().unwrap();
        finder.sort_by_date(true).sort_by_name(false);
        assert_eq!(names(&finder), ["a.txt", "b.txt", "c.txt"]);

        finder.sort_by_name(true);
        assert_eq!(names(&finder), ["c.txt", "b.txt", "a.txt"]);
    }

    #[test]
    fn sort_by_size_is_stable() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").files();
        finder.get().unwrap();
        finder.sort_by_name(false).sort_by_size(true);
        assert_eq!(
            names(&finder),
            ["file1.php", "file2.php", "file1.txt", "file2.txt", "file3.txt"]
        );
        finder.sort_by_extension(false);
        assert_eq!(
            names(&finder),
            ["file1.php", "file2.php", "file1.txt", "file2.txt", "file3.txt"]
        );
    }

    #[test]
    fn filtering_is_order_independent() {
        let (_dir, store) = cache_fixture();
        let mut first = store
            .find()
            .within("cache")
            .except(["php"])
            .only(["txt", "php"])
            .files();
        let mut second = store
            .find()
            .files()
            .only(["txt", "php"])
            .except(["php"])
            .within("cache");
        let first = first.get().unwrap().to_vec();
        let second = second.get().unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn get_relists_from_scratch() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache").only("txt");
        assert_eq!(finder.get().unwrap().len(), 3);
        store.put("cache/file4.txt", b"x").unwrap();
        assert_eq!(finder.get().unwrap().len(), 4);
        assert_eq!(finder.count(), 4);
    }

    #[test]
    fn count_matches_the_returned_collection() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("cache");
        let len = finder.get().unwrap().len();
        assert_eq!(finder.count(), len);
        let first: Vec<&Entry> = finder.iter().collect();
        let second: Vec<&Entry> = (&finder).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn recursive_listing_includes_nested_entries() {
        let (_dir, store) = cache_fixture();
        store.put("cache/nested/deep.txt", b"deep").unwrap();

        let mut flat = store.find().within("cache").only("txt");
        assert_eq!(flat.get().unwrap().len(), 3);

        let mut deep = store.find().within("cache").recursive(true).only("txt");
        assert_eq!(deep.get().unwrap().len(), 4);

        let mut dirs = store.find().within("cache").directories();
        assert_eq!(dirs.get().unwrap().paths(), ["cache/nested"]);
    }

    #[test]
    fn missing_directory_is_a_storage_error() {
        let (_dir, store) = cache_fixture();
        let mut finder = store.find().within("nowhere");
        let err = finder.get().unwrap_err();
        let storage_err = err.as_storage_error().unwrap();
        assert_eq!(storage_err.operation(), Operation::List);
        assert_eq!(storage_err.path(), "nowhere");
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn symlinks_are_not_listed() {
        let (dir, store) = cache_fixture();
        std::os::unix::fs::symlink(
            dir.path().join("cache/file1.txt"),
            dir.path().join("cache/link.txt"),
        )
        .unwrap();
        let mut finder = store.find().within("cache").only("txt");
        assert_eq!(finder.get().unwrap().len(), 3);
    }

    #[test]
    fn local_and_memory_backends_agree() {
        let (dir, local) = cache_fixture();
        let memory = MemoryStorage::new();
        for entry in local.storage().list_contents("cache", false).unwrap() {
            let contents = fs::read(dir.path().join(entry.path())).unwrap();
            memory.write(entry.path(), &contents).unwrap();
        }

        let mut from_local = local.find().within("cache").files().size("> 10");
        let mut from_memory = Finder::new(&memory).within("cache").files().size("> 10");
        let local_paths = from_local.get().unwrap().paths().join(",");
        let memory_paths = from_memory.get().unwrap().paths().join(",");
        assert_eq!(local_paths, memory_paths);
        assert_eq!(local_paths, "cache/file1.php,cache/file2.php");
    }
}
