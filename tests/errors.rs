//! Error reporting: every failure names what went wrong and where.

mod common;

use classscope::{disassembler::decode_code, ClassFile, Error};
use common::{hello_world, ClassWriter};

#[test]
fn decode_errors_carry_opcode_and_offset() {
    let cases: [(&[u8], Error); 7] = [
        (
            &[0x00, 0x11, 0x01],
            Error::Truncated {
                opcode: 0x11,
                offset: 1,
            },
        ),
        (
            // tableswitch at 0, low 5, high 4
            &[0xAA, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 4],
            Error::InvalidTableSwitch {
                offset: 0,
                low: 5,
                high: 4,
            },
        ),
        (
            &[0xAB, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF],
            Error::InvalidLookupSwitch {
                offset: 0,
                npairs: -1,
            },
        ),
        (
            &[
                0xAB, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, // default, npairs
                0, 0, 0, 3, 0, 0, 0, 1, // 3 -> 1
                0, 0, 0, 3, 0, 0, 0, 2, // 3 -> 2
            ],
            Error::DuplicateLookupKey { offset: 0, key: 3 },
        ),
        (
            &[0xB9, 0x00, 0x01, 0x00, 0x00],
            Error::InvalidInvokeInterface {
                offset: 0,
                count: 0,
                reserved: 0,
            },
        ),
        (
            &[0xBA, 0x00, 0x01, 0x00, 0x01],
            Error::InvalidInvokeDynamic {
                offset: 0,
                reserved: 1,
            },
        ),
        (
            &[0xC4, 0x10, 0x00, 0x01],
            Error::UnknownWideOpcode {
                offset: 0,
                opcode: 0x10,
            },
        ),
    ];

    for (code, expected) in cases {
        let error = decode_code(code).unwrap_err();
        assert!(error.is_decode_error(), "{error:?}");
        assert_eq!(error.to_string(), expected.to_string());
        assert_eq!(error.offset(), expected.offset());
    }
}

#[test]
fn oversized_switch_fails_before_allocating() {
    // lookupswitch claiming i32::MAX pairs with no table behind it
    let code = [0xAB, 0, 0, 0, 0, 0, 0, 0, 0x7F, 0xFF, 0xFF, 0xFF];
    assert!(matches!(
        decode_code(&code),
        Err(Error::Truncated {
            opcode: 0xAB,
            offset: 0
        })
    ));

    // tableswitch spanning the whole i32 range
    let code = [
        0xAA, 0, 0, 0, 0, 0, 0, 0, 0x80, 0, 0, 0, 0x7F, 0xFF, 0xFF, 0xFF,
    ];
    assert!(matches!(
        decode_code(&code),
        Err(Error::Truncated {
            opcode: 0xAA,
            offset: 0
        })
    ));
}

#[test]
fn error_messages_are_readable() {
    let error = decode_code(&[0x03, 0x03, 0xB6, 0x00]).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Truncated instruction - opcode 0xB6 at offset 2 runs past the end of the code"
    );
}

#[test]
fn class_file_errors() {
    let mut bytes = hello_world();
    bytes[0] = 0xCB;
    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(Error::InvalidMagic(0xCBFE_BABE))
    ));

    let bytes = hello_world();
    assert!(matches!(
        ClassFile::parse(&bytes[..bytes.len() - 3]),
        Err(Error::OutOfBounds)
    ));

    let mut bytes = hello_world();
    bytes.push(0);
    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(Error::Malformed { .. })
    ));

    assert!(matches!(ClassFile::from_mem(Vec::new()), Err(Error::Empty)));
    assert!(matches!(
        ClassFile::from_file(std::path::Path::new("/nonexistent/Missing.class")),
        Err(Error::FileError(_))
    ));
}

#[test]
fn bad_code_is_scoped_to_its_method() {
    let mut writer = ClassWriter::new("Partial", "java/lang/Object");
    writer.method(0x0001, "good", "()V", &[0xB1], &[]);
    writer.method(0x0001, "bad", "()V", &[0xC4, 0x10, 0x00, 0x01], &[]);
    let class = ClassFile::from_mem(writer.build()).unwrap();
    let pool = &class.constant_pool;

    assert!(class.methods[0].decode(pool).unwrap().is_some());
    let error = class.methods[1].decode(pool).unwrap_err();
    assert!(matches!(
        error,
        Error::UnknownWideOpcode {
            offset: 0,
            opcode: 0x10
        }
    ));
}
