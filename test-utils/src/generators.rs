//! Shared proptest generators.

use dataplane_spi::{DataAddress, DataFlowStartMessage, FlowType, TransferType};
use proptest::prelude::*;
use std::time::Duration;

/// Generate W3C Trace Context traceparent headers.
pub fn traceparent_strategy() -> impl Strategy<Value = String> {
    (
        Just("00"),
        "[0-9a-f]{31}[1-9a-f]",
        "[0-9a-f]{15}[1-9a-f]",
        prop_oneof![Just("00"), Just("01")],
    )
        .prop_map(|(version, trace_id, parent_id, flags)| {
            format!("{version}-{trace_id}-{parent_id}-{flags}")
        })
}

/// Generate valid Vault secret keys.
pub fn secret_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}(/[a-z][a-z0-9-]{0,20}){0,3}"
}

/// Generate secret keys the client must reject before sending.
pub fn invalid_secret_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "/[a-z]{1,10}",
        "[a-z]{1,10}/\\.\\./[a-z]{1,10}",
        "[a-z]{1,10}[#?][a-z=0-9]{0,10}",
        "(%2e%2e/){1,3}[a-z]{1,10}",
        "[a-z]{1,10}//[a-z]{1,10}",
        "\\./[a-z]{1,10}",
    ]
}

/// Generate TTL values (5 seconds to 24 hours).
pub fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (5u64..86400).prop_map(Duration::from_secs)
}

/// Generate HTTP status codes a remote service may answer with.
pub fn http_status_code_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(201u16),
        Just(204u16),
        Just(400u16),
        Just(401u16),
        Just(403u16),
        Just(404u16),
        Just(409u16),
        Just(429u16),
        Just(500u16),
        Just(502u16),
        Just(503u16),
    ]
}

/// Generate flow types.
pub fn flow_type_strategy() -> impl Strategy<Value = FlowType> {
    prop_oneof![Just(FlowType::Push), Just(FlowType::Pull)]
}

/// Generate transfer types such as `HttpData-PUSH`.
pub fn transfer_type_strategy() -> impl Strategy<Value = TransferType> {
    ("[A-Z][A-Za-z0-9]{1,12}", flow_type_strategy())
        .prop_map(|(destination, flow)| TransferType::new(destination, flow))
}

/// Generate data addresses with a few string properties.
pub fn data_address_strategy() -> impl Strategy<Value = DataAddress> {
    (
        "[A-Z][A-Za-z0-9]{1,12}",
        prop::collection::btree_map("[a-z][a-zA-Z]{1,10}", "[a-zA-Z0-9:/._-]{0,30}", 0..4),
    )
        .prop_map(|(address_type, properties)| {
            properties
                .into_iter()
                .filter(|(key, _)| key != DataAddress::TYPE)
                .fold(DataAddress::new(address_type), |address, (k, v)| {
                    address.with_property(k, v)
                })
        })
}

/// Generate complete start messages. PULL flows carry no destination.
pub fn start_message_strategy() -> impl Strategy<Value = DataFlowStartMessage> {
    (
        "[a-z0-9-]{8,36}",
        "[a-z0-9-]{8,36}",
        proptest::option::of("[a-z0-9-]{4,20}"),
        proptest::option::of("[a-z0-9-]{4,20}"),
        data_address_strategy(),
        data_address_strategy(),
        transfer_type_strategy(),
        prop::collection::btree_map("[a-z]{2,10}", "[a-zA-Z0-9]{0,10}", 0..3),
    )
        .prop_map(
            |(id, process_id, asset, agreement, source, destination, transfer_type, props)| {
                let mut message = DataFlowStartMessage::new(process_id, source)
                    .with_id(id)
                    .with_transfer_type(transfer_type.clone());
                message.asset_id = asset;
                message.agreement_id = agreement;
                message.properties = props;
                if transfer_type.flow_type == FlowType::Push {
                    message.destination_data_address = Some(destination);
                }
                message
            },
        )
}
