use parcel_form::{multipart, FileEntry, FormData, FormEntry};

fn sample_form() -> FormData {
    let mut form = FormData::new();
    form.insert_text("a", "1");
    form.insert_file("f", FileEntry::new("x.txt", mime::TEXT_PLAIN, "hi"));
    form
}

#[test]
fn test_text_and_file_round_trip() {
    let form = sample_form();
    let body = multipart::serialize(&form, "boundary42");
    let parsed = multipart::parse(&body, "boundary42").unwrap();

    assert_eq!(parsed.text("a"), Some("1"));
    let file = parsed.file("f").unwrap();
    assert_eq!(file.filename, "x.txt");
    assert_eq!(&file.content[..], b"hi");
    assert_eq!(parsed, form);
}

#[test]
fn test_generated_boundary_round_trip() {
    let form = sample_form();
    let boundary = multipart::generate_boundary(&form, multipart::DEFAULT_BOUNDARY_LEN);
    let body = multipart::serialize(&form, &boundary);

    assert_eq!(multipart::parse(&body, &boundary).unwrap(), form);
}

#[test]
fn test_content_resembling_delimiter() {
    let mut form = FormData::new();
    form.insert_text("text", "value with --boundary42 inside");
    let body = multipart::serialize(&form, "boundary42");

    let parsed = multipart::parse(&body, "boundary42").unwrap();
    assert_eq!(
        parsed.get("text"),
        Some(&FormEntry::Text("value with --boundary42 inside".to_string()))
    );
}
