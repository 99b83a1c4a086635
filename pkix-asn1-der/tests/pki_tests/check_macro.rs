macro_rules! check {
    ($item:ident in $encoded:ident[$start:literal..$end:literal]) => {
        let encoded = &$encoded[$start..$end];
        check!($item in encoded);
    };
    ($item:ident in $encoded:ident) => {
        let encoded = &$encoded[..];
        let item: &pkix_asn1_der::DerValue = &$item;

        println!(concat!(stringify!($item), " check..."));

        pretty_assertions::assert_eq!(
            item.to_byte_array(),
            encoded,
            concat!("re-encoded ", stringify!($item), " doesn't match")
        );

        let decoded = pkix_asn1_der::DerValue::from_der(encoded).expect(concat!(
            "failed ",
            stringify!($item),
            " decoding"
        ));
        pretty_assertions::assert_eq!(&decoded, item, concat!("decoded ", stringify!($item), " doesn't match"));
    };
}
