use staffbmp::*;

#[test]
fn upsert_orders_most_recent_last() {
    let mut storage = MemStorage::new();
    for name in ["a.bmp", "b.bmp", "a.bmp"] {
        upsert_image_in_list(&mut storage, "/images.txt", name).unwrap();
    }
    let files = read_image_list(&mut storage, "/images.txt").unwrap();
    assert_eq!(files, ["/b.bmp", "/a.bmp"]);
}

#[test]
fn upsert_keeps_leading_slash_names_as_is() {
    let mut storage = MemStorage::new();
    upsert_image_in_list(&mut storage, "/images.txt", "/x.bmp").unwrap();
    upsert_image_in_list(&mut storage, "/images.txt", "x.bmp").unwrap();
    assert_eq!(
        read_image_list(&mut storage, "/images.txt").unwrap(),
        ["/x.bmp"]
    );
}

#[test]
fn upsert_drops_comments_and_notes_from_existing_list() {
    let mut storage = MemStorage::new();
    storage.insert(
        "/images.txt",
        "# uploaded\n/old.bmp  from phone\n\n/new.bmp\n".as_bytes().to_vec(),
    );
    upsert_image_in_list(&mut storage, "/images.txt", "old.bmp").unwrap();
    assert_eq!(
        String::from_utf8(storage.get("/images.txt").unwrap()).unwrap(),
        "/new.bmp\n/old.bmp\n"
    );
}

#[test]
fn write_then_read() {
    let mut storage = MemStorage::new();
    let files = vec!["/one.bmp".to_string(), "/two.bmp".to_string()];
    write_image_list(&mut storage, "/list.txt", &files).unwrap();
    assert_eq!(read_image_list(&mut storage, "/list.txt").unwrap(), files);

    write_image_list(&mut storage, "/list.txt", &[]).unwrap();
    assert!(read_image_list(&mut storage, "/list.txt").unwrap().is_empty());
}

#[test]
fn converted_files_show_up_in_scan() {
    let mut storage = MemStorage::new();
    storage.insert("/upload.bin", vec![0u8; 4]);
    storage.insert("/staff.bmp", vec![0u8; 4]);
    storage.insert("/images.txt", Vec::new());
    assert_eq!(list_bmp_files(&mut storage).unwrap(), ["staff.bmp"]);
}
