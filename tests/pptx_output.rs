//! Reads written presentations back and checks the package structure.

#![cfg(feature = "pptx")]

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use slidegen::pptx::PptxWriter;
use slidegen::{
    ChartContent, ChartSource, DeckOptions, DeckPlan, DocumentBuilder, GenerationClient,
    ImageGenerator, RetryPolicy, SlideType, TextGenerator, TextRequest, Topic,
};
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use zip::ZipArchive;

const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

struct Scripted;

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, request: &TextRequest) -> slidegen::Result<String> {
        if request.prompt.contains("chart data") {
            return Ok("Birds, Drones, Batteries\n3, 5, 8".to_string());
        }
        Ok(format!(
            "Fact <{}> & more",
            request.slide_index.unwrap_or_default()
        ))
    }
}

/// Answers with terminal escape sequences and other control characters.
struct Noisy;

#[async_trait]
impl TextGenerator for Noisy {
    async fn generate(&self, _request: &TextRequest) -> slidegen::Result<String> {
        Ok("Hidden\u{1}signal\u{1b}[0m".to_string())
    }
}

struct Painter;

#[async_trait]
impl ImageGenerator for Painter {
    async fn generate_image(&self, _prompt: &str) -> slidegen::Result<Vec<u8>> {
        Ok(PNG.to_vec())
    }
}

async fn build_document() -> slidegen::Document {
    let client = GenerationClient::new(Arc::new(Scripted))
        .with_images(Arc::new(Painter))
        .with_retry(RetryPolicy::default().with_base_delay(Duration::ZERO));
    DocumentBuilder::new(client, DeckOptions::default())
        .build(&Topic::new("Pigeons & drones").unwrap())
        .await
        .unwrap()
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing part {}", name))
        .read_to_string(&mut content)
        .unwrap();
    content
}

/// Parse the whole part and collect the text of every `a:t` element.
fn drawing_text(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => in_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => in_text = false,
            Ok(Event::Text(e)) if in_text => texts.push(e.unescape().unwrap().into_owned()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML: {}", e),
        }
    }

    texts
}

fn assert_well_formed(xml: &str) {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML: {}", e),
        }
    }
}

#[tokio::test]
async fn test_written_package_round_trip() {
    let document = build_document().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");

    PptxWriter::new().write_to_path(&document, &path).unwrap();

    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    let slide_parts = names
        .iter()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count();
    assert_eq!(slide_parts, document.len());
    assert!(names.iter().any(|n| n == "ppt/charts/chart1.xml"));
    assert!(names.iter().any(|n| n == "ppt/media/image1.png"));

    for name in &names {
        if name.ends_with(".xml") || name.ends_with(".rels") {
            assert_well_formed(&read_part(&mut archive, name));
        }
    }

    let title = drawing_text(&read_part(&mut archive, "ppt/slides/slide1.xml"));
    assert_eq!(title[0], "Fact <0> & more");

    let closing = drawing_text(&read_part(&mut archive, "ppt/slides/slide7.xml"));
    assert_eq!(closing, vec!["Thank You!"]);

    let chart = read_part(&mut archive, "ppt/charts/chart1.xml");
    assert!(chart.contains("<c:v>Drones</c:v>"));
    assert!(chart.contains("<c:v>8</c:v>"));

    let core = read_part(&mut archive, "docProps/core.xml");
    assert!(core.contains("<dc:title>Fact &lt;0&gt; &amp; more</dc:title>"));

    let mut media = Vec::new();
    archive
        .by_name("ppt/media/image1.png")
        .unwrap()
        .read_to_end(&mut media)
        .unwrap();
    assert_eq!(media, PNG.to_vec());
}

#[tokio::test]
async fn test_content_types_cover_every_part() {
    let document = build_document().await;
    let bytes = PptxWriter::new().write_to_vec(&document).unwrap();
    let mut archive = ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

    let mut types = String::new();
    archive
        .by_name("[Content_Types].xml")
        .unwrap()
        .read_to_string(&mut types)
        .unwrap();

    for n in 1..=document.len() {
        assert!(types.contains(&format!("/ppt/slides/slide{}.xml", n)));
    }
    assert!(types.contains("/ppt/charts/chart1.xml"));
    assert!(types.contains(r#"Extension="png""#));
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

#[tokio::test]
async fn test_control_characters_never_reach_the_package() {
    let plan = DeckPlan::new([SlideType::Text, SlideType::Chart]).unwrap();
    let options = DeckOptions::default()
        .with_plan(plan)
        .with_chart_source(ChartSource::Fixed(ChartContent::new(
            vec!["Q1\u{7}".to_string(), "Q2".to_string()],
            vec![1.0, 2.0],
        )));
    let client = GenerationClient::new(Arc::new(Noisy))
        .with_retry(RetryPolicy::default().with_base_delay(Duration::ZERO));
    let document = DocumentBuilder::new(client, options)
        .build(&Topic::new("Signals").unwrap())
        .await
        .unwrap();

    let bytes = PptxWriter::new().write_to_vec(&document).unwrap();
    let mut archive = ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    for name in names.iter().filter(|n| n.ends_with(".xml") || n.ends_with(".rels")) {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let illegal: Vec<char> = content.chars().filter(|&c| !is_xml_char(c)).collect();
        assert!(illegal.is_empty(), "illegal characters in {}: {:?}", name, illegal);
        assert_well_formed(&content);

        if name == "ppt/slides/slide1.xml" {
            assert!(drawing_text(&content).contains(&"Hidden signal [0m".to_string()));
        }
        if name == "ppt/charts/chart1.xml" {
            assert!(content.contains("<c:v>Q1</c:v>"));
        }
    }
}
