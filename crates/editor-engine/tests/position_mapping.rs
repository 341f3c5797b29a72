use editor_engine::{Document, TextPosition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[char] = &['a', 'b', ' ', '\t', '\n', '\n', '\r', 'é', '你', '😀'];

fn random_text(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn test_round_trip_for_every_index() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let len = rng.gen_range(0..120);
        let doc = Document::from_text(random_text(&mut rng, len));
        for index in 0..=doc.char_count() {
            let position = doc.position_from_index(index as i64);
            assert!(position.line < doc.line_count());
            assert!(position.column <= doc.line_char_count(position.line).unwrap());
            assert_eq!(
                doc.index_from_position(position),
                index,
                "text {:?} index {index}",
                doc.text()
            );
        }
    }
}

#[test]
fn test_positions_are_monotonic() {
    let mut rng = StdRng::seed_from_u64(42);
    let doc = Document::from_text(random_text(&mut rng, 500));
    let positions: Vec<TextPosition> = (0..=doc.char_count())
        .map(|i| doc.position_from_index(i as i64))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_out_of_range_indices_clamp() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..50 {
        let len = rng.gen_range(1..80);
        let doc = Document::from_text(random_text(&mut rng, len));
        let end = doc.position_from_index(doc.char_count() as i64);
        let last_line = doc.line_count() - 1;
        assert_eq!(end.line, last_line);
        assert_eq!(end.column, doc.line_char_count(last_line).unwrap());

        assert_eq!(doc.position_from_index(-1), TextPosition::new(0, 0));
        assert_eq!(doc.position_from_index(i64::MIN), TextPosition::new(0, 0));
        assert_eq!(doc.position_from_index(doc.char_count() as i64 + 100), end);
        assert_eq!(doc.position_from_index(i64::MAX), end);
    }
}

#[test]
fn test_position_clamping_to_line_and_column() {
    let doc = Document::from_text("ab\n\ncdef");
    assert_eq!(doc.index_from_position(TextPosition::new(0, 50)), 2);
    assert_eq!(doc.index_from_position(TextPosition::new(1, 3)), 3);
    assert_eq!(doc.index_from_position(TextPosition::new(40, 2)), 6);
    assert_eq!(doc.index_from_position(TextPosition::new(40, 40)), 8);
}

#[test]
fn test_line_texts_rebuild_document() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..100 {
        let len = rng.gen_range(0..200);
        let text = random_text(&mut rng, len);
        let doc = Document::from_text(text.as_str());
        let rebuilt = doc.lines().collect::<Vec<_>>().join("\n");
        assert_eq!(rebuilt, text);
        assert_eq!(doc.char_count(), text.chars().count());
    }
}
