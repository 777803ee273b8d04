//! Deriving must work in crates that forbid `unsafe`.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

use hadron_soa::{Soa, SoaArray};

#[derive(Clone, Copy, Debug, PartialEq, Soa)]
enum Frame {
    Empty,
    Data { channel: u8, bytes: [u8; 4] },
    Close(u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Soa)]
struct Header {
    id: u32,
    flags: u8,
}

#[test]
fn enum_reads_back_without_unsafe() {
    let mut frames = SoaArray::<Frame, 4>::new();
    frames
        .append(Frame::Data {
            channel: 2,
            bytes: [1, 2, 3, 4],
        })
        .unwrap();
    frames.append(Frame::Close(1000)).unwrap();
    frames.append(Frame::Empty).unwrap();

    assert_eq!(
        frames.get(0),
        Frame::Data {
            channel: 2,
            bytes: [1, 2, 3, 4],
        }
    );
    assert_eq!(frames.get(1), Frame::Close(1000));
    assert!(frames.items().tags().eq([FrameTag::Data, FrameTag::Close, FrameTag::Empty]));
}

#[test]
fn struct_reads_back_without_unsafe() {
    let mut headers = SoaArray::<Header, 2>::new();
    headers.append(Header { id: 7, flags: 1 }).unwrap();
    assert_eq!(headers.items().id, &[7]);
}
