use crate::Result;
use dossier_store::{Folder, FolderId, FolderQuery, FolderStore, FolderUpdate, NewFolder};

/// Child of `parent` named exactly `name`, created when missing. An existing
/// folder only gets its sequence rewritten when one is given.
///
/// Read-then-create: two concurrent callers may both create the folder.
pub fn get_or_create_folder<S: FolderStore + ?Sized>(
    store: &mut S,
    parent: FolderId,
    name: &str,
    sequence: Option<i32>,
) -> Result<(Folder, bool)> {
    let query = FolderQuery::new().child_of(parent).named(name);
    if let Some(existing) = store.search_one(&query)? {
        if let Some(sequence) = sequence.filter(|s| *s != existing.sequence) {
            let update = FolderUpdate {
                sequence: Some(sequence),
                ..Default::default()
            };
            return Ok((store.update(existing.id, update)?, false));
        }
        return Ok((existing, false));
    }

    let mut new = NewFolder::new(name).parent(parent);
    if let Some(sequence) = sequence {
        new = new.sequence(sequence);
    }
    Ok((store.create(new)?, true))
}

/// Year folder (`"2024"`) directly under the workspace root.
pub fn ensure_year_folder<S: FolderStore + ?Sized>(
    store: &mut S,
    root: FolderId,
    year: i32,
) -> Result<Folder> {
    let (folder, created) = get_or_create_folder(store, root, &year.to_string(), None)?;
    if created {
        log::info!("Created year folder {} under {root}", folder.name);
    }
    Ok(folder)
}

pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}

/// `root / year / dossier` style display name.
pub fn folder_path<S: FolderStore + ?Sized>(store: &S, id: FolderId) -> Result<String> {
    let Some(folder) = store.folder(id)? else {
        return Ok(id.to_string());
    };
    let mut parts: Vec<String> = store
        .ancestors(id)?
        .into_iter()
        .rev()
        .map(|f| f.name)
        .collect();
    parts.push(folder.name);
    Ok(parts.join(" / "))
}

/// Dossier folder containing `folder`: the ancestor-or-self whose grandparent
/// is the workspace root.
pub fn dossier_of_folder<S: FolderStore + ?Sized>(
    store: &S,
    root: FolderId,
    folder: FolderId,
) -> Result<Option<Folder>> {
    let Some(start) = store.folder(folder)? else {
        return Ok(None);
    };
    let mut chain = vec![start];
    chain.extend(store.ancestors(folder)?);

    // chain[i + 2] is the grandparent of chain[i]
    for window in chain.windows(3) {
        if window[2].id == root {
            return Ok(Some(window[0].clone()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_or_create_is_idempotent() {
        let mut store = MemoryStore::new();
        let root = store.create(NewFolder::new("root")).unwrap().id;
        let (first, created) = get_or_create_folder(&mut store, root, "2. MPR", Some(11)).unwrap();
        assert!(created);
        let (second, created) = get_or_create_folder(&mut store, root, "2. MPR", Some(12)).unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(second.sequence, 12);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn year_folder_is_reused() {
        let mut store = MemoryStore::new();
        let root = store.create(NewFolder::new("Dossieres de calidad")).unwrap().id;
        let a = ensure_year_folder(&mut store, root, 2024).unwrap();
        let b = ensure_year_folder(&mut store, root, 2024).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, "2024");
        assert_eq!(a.parent, Some(root));
    }

    #[test]
    fn dossier_is_the_grandchild_of_root() {
        let mut store = MemoryStore::new();
        let root = store.create(NewFolder::new("Dossieres de calidad")).unwrap().id;
        let year = store.create(NewFolder::new("2024").parent(root)).unwrap().id;
        let dossier = store.create(NewFolder::new("ABC-VAO-0018").parent(year)).unwrap().id;
        let child = store.create(NewFolder::new("7.a Planos").parent(dossier)).unwrap().id;
        let state = store.create(NewFolder::new("Aprobado").parent(child)).unwrap().id;

        for start in [dossier, child, state] {
            let found = dossier_of_folder(&store, root, start).unwrap().map(|f| f.id);
            assert_eq!(found, Some(dossier));
        }
        assert_eq!(dossier_of_folder(&store, root, year).unwrap(), None);
        assert_eq!(dossier_of_folder(&store, root, root).unwrap(), None);
        assert_eq!(
            folder_path(&store, state).unwrap(),
            "Dossieres de calidad / 2024 / ABC-VAO-0018 / 7.a Planos / Aprobado"
        );
    }
}
