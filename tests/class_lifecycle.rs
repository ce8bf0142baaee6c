// Dynamic class builder integration tests
//
// These exercise the builder's lifecycle state machine against the
// live runtime: registration visibility, disposal, the hidden
// observation-subclass guard, delegate trampolines and super-dispatch.

#![cfg(target_os = "macos")]

use objforge::runtime::encoding::method_signature;
use objforge::{
    Class, ClassBuilder, Delegate, Error, Id, Imp, NotificationDelegate, Sel,
    OBSERVATION_SUBCLASS_PREFIX, attach_delegate, delegate_method, nil, release,
    send_base_message, send_message, send_super_message,
};
use std::ffi::CString;
use std::mem;

unsafe extern "C" fn returns_one(_this: Id, _cmd: Sel) -> i64 {
    1
}

unsafe extern "C" fn returns_two(_this: Id, _cmd: Sel) -> i64 {
    2
}

fn imp_of(f: unsafe extern "C" fn(Id, Sel) -> i64) -> Imp {
    // SAFETY: registered below with the matching q@: signature
    unsafe { mem::transmute::<unsafe extern "C" fn(Id, Sel) -> i64, Imp>(f) }
}

#[test]
fn test_register_makes_class_discoverable() {
    let superclass = Class::get("NSObject").unwrap();
    let mut builder = ClassBuilder::new("ForgeDiscoverable", superclass).unwrap();
    let name = builder.name().to_string();

    builder.add_pointer_ivar::<u8>("_payload", "ForgePayload").unwrap();
    unsafe {
        builder
            .add_method("forgeValue", imp_of(returns_one), method_signature::<i64, ()>().as_str())
            .unwrap();
    }

    assert!(Class::get(&name).is_none());
    let class = builder.register().unwrap();
    assert_eq!(Class::get(&name), Some(class));

    let obj = builder.create_instance().unwrap();
    let value: i64 = unsafe { send_message(obj, "forgeValue", ()) };
    assert_eq!(value, 1);
    unsafe { release(obj) };

    builder.dispose();
    assert!(Class::get(&name).is_none());

    // Disposing twice is a defensive no-op
    builder.dispose();
    assert!(!builder.is_leaked());
}

#[test]
fn test_hidden_subclass_blocks_disposal() {
    let superclass = Class::get("NSObject").unwrap();
    let mut builder = ClassBuilder::new("ForgeObserved", superclass).unwrap();
    let name = builder.name().to_string();
    let class = builder.register().unwrap();

    // Simulate the runtime's hidden observation subclass through the
    // raw layer (the builder never generates this prefix itself).
    let hidden_name = CString::new(format!("{OBSERVATION_SUBCLASS_PREFIX}{name}")).unwrap();
    let hidden = unsafe {
        objforge::ffi::objc_allocateClassPair(class.as_ptr(), hidden_name.as_ptr(), 0)
    };
    assert!(!hidden.is_null());
    unsafe { objforge::ffi::objc_registerClassPair(hidden) };

    builder.dispose();
    assert!(builder.is_leaked());
    assert!(
        Class::get(&name).is_some(),
        "an observed class must remain discoverable after teardown"
    );
}

#[test]
fn test_super_dispatch_reaches_inherited_implementation() {
    let root = Class::get("NSObject").unwrap();

    let mut parent = ClassBuilder::new("ForgeSuperParent", root).unwrap();
    unsafe {
        parent
            .add_method("forgeDepth", imp_of(returns_one), method_signature::<i64, ()>().as_str())
            .unwrap();
    }
    let parent_class = parent.register().unwrap();

    let mut child = ClassBuilder::new("ForgeSuperChild", parent_class).unwrap();
    unsafe {
        child
            .add_method("forgeDepth", imp_of(returns_two), method_signature::<i64, ()>().as_str())
            .unwrap();
    }
    child.register().unwrap();

    let obj = child.create_instance().unwrap();
    unsafe {
        let overridden: i64 = send_message(obj, "forgeDepth", ());
        assert_eq!(overridden, 2);

        let inherited: i64 = send_super_message(obj, parent_class, "forgeDepth", ());
        assert_eq!(inherited, 1);

        release(obj);
    }
    // child drops (and disposes) before parent by declaration order
}

struct ClickCounter {
    clicks: u32,
    last_notification: Id,
}

impl Delegate for ClickCounter {
    const BASE_CLASS: &'static str = "NSObject";
    const NAME: &'static str = "ForgeClickCounter";
    const IVAR: &'static str = "_delegate";
}

impl NotificationDelegate for ClickCounter {
    fn handle_notification(&mut self, notification: Id) {
        self.clicks += 1;
        self.last_notification = notification;
    }
}

impl ClickCounter {
    fn total(&mut self, extra: i64) -> i64 {
        i64::from(self.clicks) + extra
    }
}

#[test]
fn test_delegate_trampolines() {
    let mut builder = ClassBuilder::for_delegate::<ClickCounter>().unwrap();
    builder.add_notification_method::<ClickCounter, _>("onPing:").unwrap();

    let imp = delegate_method!(ClickCounter, total, (extra: i64) -> i64);
    unsafe {
        builder
            .add_method("totalWithExtra:", imp, method_signature::<i64, (i64,)>().as_str())
            .unwrap();
    }
    builder.register().unwrap();

    let obj = builder.create_instance().unwrap();

    // Unset slot: the trampoline answers with a default value and the
    // notification path drops the message
    unsafe {
        let before: i64 = send_message(obj, "totalWithExtra:", (5i64,));
        assert_eq!(before, 0);
        send_message::<(), _, _>(obj, "onPing:", (nil(),));
    }

    let mut counter = ClickCounter {
        clicks: 0,
        last_notification: nil(),
    };
    unsafe {
        attach_delegate(obj, &mut counter).unwrap();

        send_message::<(), _, _>(obj, "onPing:", (nil(),));
        send_message::<(), _, _>(obj, "onPing:", (nil(),));
        assert_eq!(counter.clicks, 2);

        let total: i64 = send_message(obj, "totalWithExtra:", (40i64,));
        assert_eq!(total, 42);

        // The inherited NSObject implementation still answers through
        // the super-dispatch helper
        let this: Id = send_base_message::<ClickCounter, Id, _, _>(obj, "self", ());
        assert_eq!(this, obj);

        release(obj);
    }
}

#[test]
fn test_protocol_conformance() {
    let superclass = Class::get("NSObject").unwrap();
    let mut builder = ClassBuilder::new("ForgeConformant", superclass).unwrap();

    // The NSObject protocol ships with the runtime
    builder.add_protocol("NSObject", false).unwrap();

    let missing = builder.add_protocol("ObjforgeMissingProtocol", false);
    assert!(matches!(missing, Err(Error::ProtocolNotFound { .. })));

    // Force-allocation registers the protocol on the fly
    builder.add_protocol("ObjforgeForcedProtocol", true).unwrap();

    let class = builder.register().unwrap();
    let ns_protocol = objforge::Protocol::get("NSObject").unwrap();
    let forged_protocol = objforge::Protocol::get("ObjforgeForcedProtocol").unwrap();
    assert!(class.conforms_to(ns_protocol));
    assert!(class.conforms_to(forged_protocol));
}

#[test]
fn test_typed_ivar_round_trip() {
    let superclass = Class::get("NSObject").unwrap();
    let mut builder = ClassBuilder::new("ForgeStorage", superclass).unwrap();
    builder.add_ivar::<u64>("_value").unwrap();
    builder.register().unwrap();

    let obj = builder.create_instance().unwrap();
    unsafe {
        objforge::runtime::object::set_ivar(obj, "_value", &0xFEED_FACE_u64).unwrap();

        let slot = objforge::runtime::object::ivar_mut::<u64>(obj, "_value").unwrap();
        assert_eq!(*slot, 0xFEED_FACE_u64);

        // Width mismatch is rejected before any copy
        let narrow = objforge::runtime::object::set_ivar(obj, "_value", &1u32);
        assert!(matches!(narrow, Err(Error::IvarSizeMismatch { expected: 8, actual: 4 })));

        release(obj);
    }
}
