/// Builds the gRPC client and server code for the `datasvc.proto`
/// definition using `tonic-prost-build`.
///
/// The file descriptor set for `proto/datasvc.proto` is constructed
/// in-process (so no `protoc` binary is required) and written next to
/// the generated code so the server can register it with the gRPC
/// reflection service.
use std::env;
use std::fs;
use std::path::PathBuf;

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto,
};

fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::String as i32),
        json_name: Some(name.to_owned()),
        ..Default::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        ..Default::default()
    }
}

fn method(
    name: &str,
    input_type: &str,
    output_type: &str,
    client_streaming: bool,
    server_streaming: bool,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_owned()),
        input_type: Some(input_type.to_owned()),
        output_type: Some(output_type.to_owned()),
        client_streaming: Some(client_streaming),
        server_streaming: Some(server_streaming),
        ..Default::default()
    }
}

/// The descriptor set equivalent to compiling `proto/datasvc.proto`
/// with `protoc`.
fn file_descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("datasvc.proto".to_owned()),
            package: Some("datasvc".to_owned()),
            syntax: Some("proto3".to_owned()),
            message_type: vec![
                message("DataRequest", vec![string_field("request", 1)]),
                message("DataResponse", vec![string_field("value", 1)]),
                message("EmptyRequest", vec![]),
            ],
            service: vec![ServiceDescriptorProto {
                name: Some("DataService".to_owned()),
                method: vec![
                    method(
                        "Get",
                        ".datasvc.DataRequest",
                        ".datasvc.DataResponse",
                        false,
                        false,
                    ),
                    method(
                        "StreamingGet",
                        ".datasvc.EmptyRequest",
                        ".datasvc.DataResponse",
                        false,
                        true,
                    ),
                    method(
                        "StreamingPut",
                        ".datasvc.DataRequest",
                        ".datasvc.DataResponse",
                        true,
                        false,
                    ),
                ],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("datasvc_descriptor.bin");

    let fds = file_descriptor_set();
    fs::write(&descriptor_path, fds.encode_to_vec()).unwrap();

    tonic_prost_build::configure().compile_fds(fds).unwrap();

    println!("cargo:rerun-if-changed=proto/datasvc.proto");
    println!("cargo:rerun-if-changed=build.rs");
}
