//! Minimal class-file writer shared by the integration tests.

#![allow(dead_code)]

use classscope::{classfile::mutf8, file::io::push_be};

/// Writes a version 52.0 class file with a growing constant pool.
pub struct ClassWriter {
    pool: Vec<u8>,
    pool_count: u16,
    utf8: Vec<(String, u16)>,
    this_class: u16,
    super_class: u16,
    methods: Vec<u8>,
    method_count: u16,
}

impl ClassWriter {
    pub fn new(name: &str, super_name: &str) -> Self {
        let mut writer = ClassWriter {
            pool: Vec::new(),
            pool_count: 1,
            utf8: Vec::new(),
            this_class: 0,
            super_class: 0,
            methods: Vec::new(),
            method_count: 0,
        };
        writer.this_class = writer.class(name);
        writer.super_class = writer.class(super_name);
        writer
    }

    fn next_index(&mut self, slots: u16) -> u16 {
        let index = self.pool_count;
        self.pool_count += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some((_, index)) = self.utf8.iter().find(|(existing, _)| existing == value) {
            return *index;
        }
        let bytes = mutf8::encode(value);
        self.pool.push(1);
        push_be(&mut self.pool, bytes.len() as u16);
        self.pool.extend_from_slice(&bytes);
        let index = self.next_index(1);
        self.utf8.push((value.to_string(), index));
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.pool.push(3);
        push_be(&mut self.pool, value);
        self.next_index(1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.pool.push(5);
        push_be(&mut self.pool, value);
        self.next_index(2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.pool.push(7);
        push_be(&mut self.pool, name_index);
        self.next_index(1)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        self.pool.push(8);
        push_be(&mut self.pool, string_index);
        self.next_index(1)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.pool.push(12);
        push_be(&mut self.pool, name_index);
        push_be(&mut self.pool, descriptor_index);
        let name_and_type = self.next_index(1);

        self.pool.push(tag);
        push_be(&mut self.pool, class_index);
        push_be(&mut self.pool, name_and_type);
        self.next_index(1)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, owner, name, descriptor)
    }

    /// Adds a method with a `Code` attribute; handlers are `(start, end, handler, catch_type)`.
    pub fn method(
        &mut self,
        flags: u16,
        name: &str,
        descriptor: &str,
        code: &[u8],
        handlers: &[(u16, u16, u16, u16)],
    ) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let code_name = self.utf8("Code");

        let mut body = Vec::new();
        push_be(&mut body, 4_u16);
        push_be(&mut body, 4_u16);
        push_be(&mut body, code.len() as u32);
        body.extend_from_slice(code);
        push_be(&mut body, handlers.len() as u16);
        for (start, end, handler, catch_type) in handlers {
            for value in [start, end, handler, catch_type] {
                push_be(&mut body, *value);
            }
        }
        push_be(&mut body, 0_u16);

        push_be(&mut self.methods, flags);
        push_be(&mut self.methods, name_index);
        push_be(&mut self.methods, descriptor_index);
        push_be(&mut self.methods, 1_u16);
        push_be(&mut self.methods, code_name);
        push_be(&mut self.methods, body.len() as u32);
        self.methods.extend_from_slice(&body);
        self.method_count += 1;
    }

    /// Adds a method without code, as declared `abstract` or `native`.
    pub fn abstract_method(&mut self, flags: u16, name: &str, descriptor: &str) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        push_be(&mut self.methods, flags);
        push_be(&mut self.methods, name_index);
        push_be(&mut self.methods, descriptor_index);
        push_be(&mut self.methods, 0_u16);
        self.method_count += 1;
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_be(&mut out, 0xCAFE_BABE_u32);
        push_be(&mut out, 0_u16);
        push_be(&mut out, 52_u16);
        push_be(&mut out, self.pool_count);
        out.extend_from_slice(&self.pool);
        push_be(&mut out, 0x0021_u16);
        push_be(&mut out, self.this_class);
        push_be(&mut out, self.super_class);
        push_be(&mut out, 0_u16);
        push_be(&mut out, 0_u16);
        push_be(&mut out, self.method_count);
        out.extend_from_slice(&self.methods);
        push_be(&mut out, 0_u16);
        out
    }
}

/// The classic greeting, as `javac` emits it for `main(String[])`.
pub fn hello_world() -> Vec<u8> {
    let mut class = ClassWriter::new("Hello", "java/lang/Object");

    let init = class.method_ref("java/lang/Object", "<init>", "()V");
    let out = class.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let greeting = class.string("Hello, World!");
    let println = class.method_ref("java/io/PrintStream", "println", "(Ljava/lang/String;)V");

    let [init_hi, init_lo] = init.to_be_bytes();
    class.method(0x0001, "<init>", "()V", &[0x2A, 0xB7, init_hi, init_lo, 0xB1], &[]);

    let [out_hi, out_lo] = out.to_be_bytes();
    let [println_hi, println_lo] = println.to_be_bytes();
    let greeting = u8::try_from(greeting).unwrap();
    class.method(
        0x0009,
        "main",
        "([Ljava/lang/String;)V",
        &[
            0xB2, out_hi, out_lo, // getstatic System.out
            0x12, greeting, // ldc "Hello, World!"
            0xB6, println_hi, println_lo, // invokevirtual println
            0xB1, // return
        ],
        &[],
    );

    class.build()
}
