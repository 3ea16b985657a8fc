use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::*;

fn kind_of(data: &[u8]) -> ErrorKind {
    decode(data).unwrap_err().kind()
}

fn sample_torrent() -> Value {
    let mut info = Dictionary::new();
    info.try_insert("piece length", 16384i64).unwrap();
    info.try_insert("name", "test.txt").unwrap();
    info.try_insert("length", 1024i64).unwrap();
    info.try_insert("pieces", Value::bytes(vec![0xabu8; 20]))
        .unwrap();

    let tiers = Value::List(vec![
        Value::List(vec![Value::string("http://tracker.example.com/announce")]),
        Value::List(vec![
            Value::string("udp://tracker.example.org:6969"),
            Value::Integer(-7),
        ]),
    ]);

    let mut root = Dictionary::new();
    root.try_insert("info", info).unwrap();
    root.try_insert("announce", "http://tracker.example.com/announce")
        .unwrap();
    root.try_insert("announce-list", tiers).unwrap();
    root.try_insert("creation date", 1_700_000_000i64).unwrap();
    Value::Dict(root)
}

type Outcome = Result<Option<Value>, (ErrorKind, Option<u64>, String)>;

fn outcome(result: Result<Option<Value>, BencodeError>) -> Outcome {
    result.map_err(|e| (e.kind(), e.position(), e.to_string()))
}

/// Parses `data` through every reader implementation.
async fn parse_every_way(data: &'static [u8]) -> Vec<Outcome> {
    vec![
        outcome(decode(data)),
        outcome(Parser::new(IoReader::new(data)).parse_blocking()),
        outcome(
            Parser::new(AsyncReader::new(data).with_segment_size(1))
                .parse()
                .await,
        ),
        outcome(
            Parser::new(AsyncReader::new(data).with_segment_size(3))
                .parse()
                .await,
        ),
    ]
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap().unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i-42e").unwrap().unwrap(), Value::Integer(-42));
    assert_eq!(decode(b"i0e").unwrap().unwrap(), Value::Integer(0));
}

#[test]
fn test_decode_integer_invalid() {
    assert_eq!(kind_of(b"i-0e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i03e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i00e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i01e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i-01e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"ie"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i-e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i1-2e"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"i 1e"), ErrorKind::Invalid);
}

#[test]
fn test_integer_boundaries() {
    assert_eq!(
        decode(b"i9223372036854775807e").unwrap().unwrap(),
        Value::Integer(i64::MAX)
    );
    assert_eq!(
        decode(b"i-9223372036854775808e").unwrap().unwrap(),
        Value::Integer(i64::MIN)
    );
    assert_eq!(kind_of(b"i9223372036854775808e"), ErrorKind::Unsupported);
    assert_eq!(kind_of(b"i-9223372036854775809e"), ErrorKind::Unsupported);
    assert_eq!(kind_of(b"i12345678901234567890e"), ErrorKind::Unsupported);
}

#[test]
fn test_integer_error_messages() {
    let err = decode(b"i-0e").unwrap_err();
    assert_eq!(err.position(), Some(0));
    assert_eq!(err.node(), Some(NodeKind::Integer));
    assert!(err.to_string().contains("'-0' is not a valid number"));

    let err = decode(b"i12a4e").unwrap_err();
    assert_eq!(err.position(), Some(3));
    assert!(err.to_string().contains("'a'"));

    let err = decode(b"i42").unwrap_err();
    assert_eq!(err.position(), Some(0));
    assert!(err.to_string().contains("missing end character"));

    let err = decode(b"ie").unwrap_err();
    assert!(err.to_string().contains("contains no digits"));
}

#[test]
fn test_decode_bytes() {
    assert_eq!(
        decode(b"4:spam").unwrap().unwrap(),
        Value::Bytes(ByteString::from_static(b"spam"))
    );
    assert_eq!(
        decode(b"0:").unwrap().unwrap(),
        Value::Bytes(ByteString::from_static(b""))
    );
    assert_eq!(
        decode(b"3:\x00\xff\n").unwrap().unwrap().as_bytes(),
        Some(&b"\x00\xff\n"[..])
    );
}

#[test]
fn test_string_boundaries() {
    let err = decode(b"5:ab").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.position(), Some(0));
    assert!(err
        .to_string()
        .contains("expected 5 bytes, could only read 2"));

    assert_eq!(kind_of(b"2147483648:abc"), ErrorKind::Unsupported);
    assert_eq!(kind_of(b"12345678901:abc"), ErrorKind::Unsupported);
    assert_eq!(kind_of(b"2147483647:abc"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"05:hello"), ErrorKind::Invalid);
    assert_eq!(kind_of(b"4spam"), ErrorKind::Invalid);

    let err = decode(b"4").unwrap_err();
    assert_eq!(err.position(), Some(1));
    assert!(err
        .to_string()
        .contains("expected ':' but reached end of input"));
}

#[test]
fn test_string_length_limit_is_configurable() {
    let config = ParserConfig::default().with_max_string_length(3);
    let mut parser = Parser::new(SliceReader::new(&b"4:spam"[..])).with_config(config);
    assert!(parser.parse_blocking().unwrap_err().is_unsupported());

    let mut parser = Parser::new(SliceReader::new(&b"3:foo"[..])).with_config(config);
    assert_eq!(parser.parse_blocking().unwrap(), Some(Value::string("foo")));
}

#[test]
fn test_decode_list() {
    let result = decode(b"l4:spam3:fooi42ee").unwrap().unwrap();
    assert_eq!(
        result,
        Value::List(vec![
            Value::string("spam"),
            Value::string("foo"),
            Value::Integer(42),
        ])
    );
}

#[test]
fn test_decode_dict() {
    let result = decode(b"d3:bar4:spam3:fooi42ee").unwrap().unwrap();
    let dict = result.as_dict().unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(b"bar"), Some(&Value::string("spam")));
    assert_eq!(dict.get(b"foo"), Some(&Value::Integer(42)));
    assert_eq!(encode(&result).unwrap(), b"d3:bar4:spam3:fooi42ee");
}

#[test]
fn test_empty_dict() {
    let result = decode(b"de").unwrap().unwrap();
    assert_eq!(result, Value::Dict(Dictionary::new()));
    assert_eq!(encode(&result).unwrap(), b"de");
}

#[test]
fn test_integer_dictionary_key() {
    let err = decode(b"di1e0:e").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.position(), Some(1));
    assert_eq!(err.node(), Some(NodeKind::Dictionary));
    assert!(err.to_string().contains("dictionary keys must be strings"));

    let cause = err.innermost();
    assert_eq!(cause.node(), Some(NodeKind::ByteString));
    assert!(cause.to_string().contains("expected ':' but found 'i'"));
}

#[test]
fn test_duplicate_dictionary_key() {
    let err = decode(b"d3:fooi1e3:fooi2ee").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.position(), Some(9));
    assert!(err.to_string().contains("already contains key foo"));
}

#[test]
fn test_dictionary_value_errors() {
    let err = decode(b"d3:fooi01ee").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert!(err.to_string().contains("could not parse dictionary value"));
    assert!(err.innermost().to_string().contains("leading zeros"));

    // Limits are never reported as malformed input.
    let err = decode(b"d3:fooi9223372036854775808ee").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(err.position(), Some(6));

    let err = decode(b"d3:foo").unwrap_err();
    assert!(err.to_string().contains("missing value for key foo"));
}

#[test]
fn test_unterminated_containers() {
    let err = decode(b"l4:spami42e").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.position(), Some(0));
    assert_eq!(err.node(), Some(NodeKind::List));
    assert!(err.to_string().contains("missing end character"));

    let err = decode(b"d3:foo3:bar").unwrap_err();
    assert_eq!(err.position(), Some(0));
    assert_eq!(err.node(), Some(NodeKind::Dictionary));
}

#[test]
fn test_child_errors_propagate_unchanged() {
    let err = decode(b"l4:spamxe").unwrap_err();
    assert_eq!(err.position(), Some(7));
    assert_eq!(err.node(), None);
    assert!(err
        .to_string()
        .contains("unexpected beginning character 'x'"));
}

#[tokio::test]
async fn test_empty_input() {
    assert_eq!(decode(b"").unwrap(), None);
    assert_eq!(decode_bytes(Bytes::new()).unwrap(), None);
    assert_eq!(decode_from_reader(&b""[..]).unwrap(), None);
    assert_eq!(decode_async(&b""[..]).await.unwrap(), None);

    let mut parser = Parser::new(SliceReader::new(Bytes::new()));
    assert_eq!(parser.next_value_blocking().unwrap(), None);
    assert_eq!(parser.parse_blocking().unwrap(), None);

    // Trailing data is still rejected after a value.
    assert!(decode(b"i1e ").unwrap_err().is_invalid());
}

#[test]
fn test_trailing_data_error() {
    let err = decode(b"i42eextra").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.position(), Some(4));
}

#[test]
fn test_nesting_limit() {
    let ok = format!("{}{}", "l".repeat(DEFAULT_MAX_DEPTH), "e".repeat(DEFAULT_MAX_DEPTH));
    assert!(decode(ok.as_bytes()).is_ok());

    let deep = format!(
        "{}{}",
        "l".repeat(DEFAULT_MAX_DEPTH + 1),
        "e".repeat(DEFAULT_MAX_DEPTH + 1)
    );
    let err = decode(deep.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(err.position(), Some(DEFAULT_MAX_DEPTH as u64));

    let dicts = format!("{}i1e{}", "d1:a".repeat(100), "e".repeat(100));
    assert_eq!(kind_of(dicts.as_bytes()), ErrorKind::Unsupported);
}

#[test]
fn test_decode_as() {
    assert_eq!(decode_as::<i64>(b"i5e").unwrap().unwrap(), 5);
    assert_eq!(
        decode_as::<ByteString>(b"4:spam").unwrap().unwrap(),
        ByteString::from("spam")
    );
    assert_eq!(decode_as::<Vec<Value>>(b"le").unwrap(), Some(vec![]));
    assert_eq!(decode_as::<i64>(b"").unwrap(), None);

    let err = decode_as::<Dictionary>(b"le").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.node(), Some(NodeKind::Dictionary));
    assert!(err.to_string().contains("expected dictionary but found list"));
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Value::Integer(42)).unwrap(), b"i42e");
    assert_eq!(encode(&Value::Integer(-42)).unwrap(), b"i-42e");
    assert_eq!(encode(&Value::Integer(0)).unwrap(), b"i0e");
    assert_eq!(
        encode(&Value::Integer(i64::MIN)).unwrap(),
        b"i-9223372036854775808e"
    );
}

#[test]
fn test_encode_bytes() {
    assert_eq!(encode(&Value::string("spam")).unwrap(), b"4:spam");
    assert_eq!(encode(&Value::string("")).unwrap(), b"0:");
}

#[test]
fn test_encode_list() {
    let list = Value::List(vec![Value::string("spam"), Value::Integer(42)]);
    assert_eq!(encode(&list).unwrap(), b"l4:spami42ee");
}

#[test]
fn test_encoded_len_matches_output() {
    let value = sample_torrent();
    let encoded = encode(&value).unwrap();
    assert_eq!(value.encoded_len(), encoded.len());

    for n in [0, 9, 10, -1, -10, i64::MAX, i64::MIN] {
        let value = Value::Integer(n);
        assert_eq!(value.encoded_len(), encode(&value).unwrap().len());
    }

    let long = Value::bytes(vec![b'x'; 12345]);
    assert_eq!(long.encoded_len(), 6 + 12345);
}

#[test]
fn test_canonical_order() {
    let sorted = decode(b"d1:a2:bc3:one3:twoe").unwrap().unwrap();
    let unsorted = decode(b"d3:one3:two1:a2:bce").unwrap().unwrap();
    assert_eq!(sorted, unsorted);
    assert_eq!(encode(&sorted).unwrap(), b"d1:a2:bc3:one3:twoe");
    assert_eq!(encode(&unsorted).unwrap(), b"d1:a2:bc3:one3:twoe");
}

#[test]
fn test_roundtrip() {
    // Keys must be sorted lexicographically for bencode roundtrip
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap().unwrap();
    let encoded = encode(&decoded).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_built_tree_roundtrip_and_idempotence() {
    let value = sample_torrent();
    let encoded = encode(&value).unwrap();
    let decoded = decode(&encoded).unwrap().unwrap();
    assert_eq!(decoded, value);
    assert_eq!(encode(&decoded).unwrap(), encoded);
}

#[test]
fn test_nested_structures() {
    let data = b"d4:listl4:spami42eee";
    let decoded = decode(data).unwrap().unwrap();
    let encoded = encode(&decoded).unwrap();
    assert_eq!(encoded, data);
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());
    assert_eq!(value.kind(), NodeKind::Integer);

    let value = Value::string("test");
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let mut value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());
    value.as_list_mut().unwrap().push(Value::Integer(1));
    assert_eq!(value.into_list(), Some(vec![Value::Integer(1)]));
}

#[test]
fn test_display_encoding_is_presentation_only() {
    let plain = ByteString::from_static(b"na\xefve");
    let latin1 = plain.clone().with_encoding(TextEncoding::Latin1);
    assert_eq!(plain, latin1);
    assert_eq!(latin1.to_text(), "naïve");
    assert_eq!(
        encode(&Value::Bytes(plain)).unwrap(),
        encode(&Value::Bytes(latin1)).unwrap()
    );
}

#[test]
fn test_decode_bytes_is_zero_copy() {
    let data = Bytes::from_static(b"l5:hello5:worlde");
    let range = data.as_ptr() as usize..data.as_ptr() as usize + data.len();
    let value = decode_bytes(data.clone()).unwrap().unwrap();
    for item in value.as_list().unwrap() {
        let ptr = item.as_bytes().unwrap().as_ptr() as usize;
        assert!(range.contains(&ptr));
    }
}

#[test]
fn test_concatenated_values() {
    let mut parser = Parser::new(SliceReader::new(&b"i1ed1:ai2eei3e"[..]));
    assert_eq!(
        parser.next_value_blocking().unwrap(),
        Some(Value::Integer(1))
    );
    assert!(parser.next_value_blocking().unwrap().unwrap().as_dict().is_some());
    assert_eq!(parser.reader().position(), 11);
    assert_eq!(
        parser.next_value_blocking().unwrap(),
        Some(Value::Integer(3))
    );
    assert_eq!(parser.next_value_blocking().unwrap(), None);
}

#[test]
fn test_info_hash_ignores_insertion_order() {
    let a = Dictionary::try_from_pairs([("name", "x"), ("comment", "y")]).unwrap();
    let b = Dictionary::try_from_pairs([("comment", "y"), ("name", "x")]).unwrap();
    assert_eq!(
        info_hash(&Value::Dict(a)).unwrap(),
        info_hash(&Value::Dict(b)).unwrap()
    );
}

#[test]
fn test_encode_to_writer_and_buf() {
    let value = sample_torrent();
    let expected = encode(&value).unwrap();

    let mut out = Vec::new();
    let written = encode_to_writer(&value, &mut out).unwrap();
    assert_eq!(written, expected.len());
    assert_eq!(out, expected);

    let mut buf = bytes::BytesMut::new();
    encode_to_buf(&value, &mut buf).unwrap();
    assert_eq!(&buf[..], &expected[..]);

    let mut storage = [0u8; 8];
    let mut exact = &mut storage[..];
    encode_to_buf(&Value::string("spam"), &mut exact).unwrap();
    assert_eq!(exact.len(), 2);
    assert_eq!(&storage[..6], b"4:spam");
}

#[test]
fn test_encode_to_short_buf() {
    let mut storage = [0u8; 3];
    let mut short = &mut storage[..];
    let err = encode_to_buf(&Value::string("spam"), &mut short).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("encoding needs 6"));
    assert_eq!(short.len(), 3);
    assert_eq!(storage, [0u8; 3]);
}

#[test]
fn test_decode_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sample.torrent");
    let value = sample_torrent();

    let mut file = std::fs::File::create(&path).unwrap();
    let written = encode_to_writer(&value, &mut file).unwrap();
    drop(file);
    assert_eq!(written as u64, std::fs::metadata(&path).unwrap().len());

    let file = std::fs::File::open(&path).unwrap();
    let decoded = decode_from_reader(file).unwrap().unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_io_reader_with_length_reports_short_string() {
    let data = &b"10:abc"[..];
    let mut parser = Parser::new(IoReader::new(data).with_length(data.len() as u64));
    let err = parser.parse_blocking().unwrap_err();
    assert!(err
        .to_string()
        .contains("expected 10 bytes, could only read 3"));
}

#[tokio::test]
async fn test_readers_agree() {
    let inputs: [&'static [u8]; 12] = [
        b"4:spam",
        b"i42e",
        b"l4:spam3:fooi42ee",
        b"d3:bar4:spam3:fooi42ee",
        b"d3:one3:two1:a2:bce",
        b"de",
        b"di1e0:e",
        b"5:ab",
        b"i9223372036854775808e",
        b"l4:spamxe",
        b"d3:fooi1e3:fooi2ee",
        b"i1ei2e",
    ];

    for input in inputs {
        let outcomes = parse_every_way(input).await;
        for other in &outcomes[1..] {
            assert_eq!(&outcomes[0], other, "input {:?}", input);
        }
    }
}

#[tokio::test]
async fn test_slice_reader_lookahead() {
    let mut reader = SliceReader::new(&b"ab"[..]);
    assert_eq!(reader.remaining(), b"ab");
    assert_eq!(reader.peek().await.unwrap(), Some(b'a'));
    assert_eq!(reader.peek().await.unwrap(), Some(b'a'));
    assert_eq!(reader.position(), 0);
    assert_eq!(reader.previous(), None);

    assert_eq!(reader.read_byte().await.unwrap(), Some(b'a'));
    assert_eq!(reader.previous(), Some(b'a'));
    assert_eq!(reader.remaining(), b"b");
    assert_eq!(reader.read_bytes(5).await.unwrap(), Bytes::from_static(b"b"));
    assert!(reader.is_eof().await.unwrap());
    assert_eq!(reader.read_byte().await.unwrap(), None);
    assert!(reader.remaining().is_empty());
    assert_eq!(reader.position(), 2);
    assert_eq!(reader.length(), Some(2));
}

#[tokio::test]
async fn test_io_reader_lookahead() {
    let mut reader = IoReader::new(&b"xyz"[..]);
    assert_eq!(reader.peek().await.unwrap(), Some(b'x'));
    assert_eq!(reader.peek().await.unwrap(), Some(b'x'));
    // The peeked byte is held by the reader, not left in the source.
    assert_eq!(*reader.get_ref(), &b"yz"[..]);

    assert_eq!(
        reader.read_bytes(2).await.unwrap(),
        Bytes::from_static(b"xy")
    );
    assert_eq!(reader.position(), 2);
    assert_eq!(reader.previous(), Some(b'y'));
    assert_eq!(reader.length(), None);

    assert_eq!(reader.read_bytes(4).await.unwrap(), Bytes::from_static(b"z"));
    assert!(reader.is_eof().await.unwrap());
    assert_eq!(reader.read_bytes(4).await.unwrap(), Bytes::new());
    assert_eq!(reader.position(), 3);
}

#[tokio::test]
async fn test_async_reader_spanning_segments() {
    let mut reader = AsyncReader::new(&b"abcdefghijkl"[..]).with_segment_size(4);

    assert_eq!(reader.read_bytes(2).await.unwrap(), Bytes::from_static(b"ab"));
    assert_eq!(
        reader.read_bytes(8).await.unwrap(),
        Bytes::from_static(b"cdefghij")
    );
    assert_eq!(reader.position(), 10);
    assert_eq!(reader.previous(), Some(b'j'));
    assert_eq!(reader.peek().await.unwrap(), Some(b'k'));

    assert_eq!(reader.read_bytes(10).await.unwrap(), Bytes::from_static(b"kl"));
    assert_eq!(reader.read_byte().await.unwrap(), None);
    assert_eq!(reader.position(), 12);
}

#[tokio::test]
async fn test_async_reader_reads_within_segment_share_memory() {
    let mut reader = AsyncReader::new(&b"0123456789"[..]);
    assert_eq!(reader.buffered_segments(), 0);

    let a = reader.read_bytes(2).await.unwrap();
    assert_eq!(reader.buffered_segments(), 1);
    let b = reader.read_bytes(5).await.unwrap();
    assert_eq!(&a[..], b"01");
    assert_eq!(&b[..], b"23456");
    assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 2);
}

#[tokio::test]
async fn test_async_reader_read_across_segments_copies() {
    let mut reader = AsyncReader::new(&b"abcdefgh"[..]).with_segment_size(4);

    let first = reader.read_bytes(2).await.unwrap();
    let segment = first.as_ptr() as usize..first.as_ptr() as usize + 4;
    let spanning = reader.read_bytes(6).await.unwrap();
    assert_eq!(&spanning[..], b"cdefgh");
    assert!(!segment.contains(&(spanning.as_ptr() as usize)));
    assert_eq!(reader.buffered_segments(), 0);
}

#[tokio::test]
async fn test_async_reader_cancelled_with_buffered_data() {
    let token = CancellationToken::new();
    let mut reader = AsyncReader::new(&b"4:spam"[..]).with_cancellation(token.clone());
    assert_eq!(reader.peek().await.unwrap(), Some(b'4'));
    assert_eq!(reader.buffered_segments(), 1);

    token.cancel();
    assert_eq!(
        reader.read_byte().await.unwrap_err().kind(),
        ErrorKind::Cancelled
    );
    assert_eq!(
        reader.read_bytes(2).await.unwrap_err().kind(),
        ErrorKind::Cancelled
    );
    assert_eq!(reader.position(), 0);
}

#[tokio::test]
async fn test_async_reader_over_pipe() {
    let value = sample_torrent();
    let encoded = encode(&value).unwrap();

    let (mut client, server) = tokio::io::duplex(5);
    let writer = tokio::spawn(async move {
        for chunk in encoded.chunks(3) {
            client.write_all(chunk).await.unwrap();
        }
    });

    let decoded = decode_async(server).await.unwrap().unwrap();
    writer.await.unwrap();
    assert_eq!(decoded, value);
}

#[tokio::test]
async fn test_async_parse_cancelled() {
    let (mut client, server) = tokio::io::duplex(64);
    client.write_all(b"l4:spam").await.unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let err = decode_async_with_cancel(server, token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    drop(client);
}

#[tokio::test]
async fn test_async_unterminated_input() {
    let (mut client, server) = tokio::io::duplex(64);
    client.write_all(b"d3:foo").await.unwrap();
    drop(client);

    let err = decode_async(server).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.position(), Some(6));
}

#[tokio::test]
async fn test_encode_async() {
    let value = sample_torrent();
    let expected = encode(&value).unwrap();

    let mut out = Vec::new();
    let written = encode_async(&value, &mut out).await.unwrap();
    assert_eq!(written, expected.len());
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_next_value_as_async() {
    let mut parser = Parser::new(AsyncReader::new(&b"i7e4:spam"[..]));
    assert_eq!(parser.next_value_as::<i64>().await.unwrap(), Some(7));

    let err = parser.next_value_as::<i64>().await.unwrap_err();
    assert_eq!(err.position(), Some(3));
    assert_eq!(err.node(), Some(NodeKind::Integer));
}
