// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kestrel_vm::ecmascript::execution::agent::Options;
use kestrel_vm::ecmascript::execution::{initialize_default_realm, Agent, DefaultHostHooks};
use kestrel_vm::ecmascript::scripts_and_modules::script::{parse_script, script_evaluation};
use kestrel_vm::ecmascript::types::{String as JsString, Value};

fn eval(agent: &mut Agent, source: &str) -> Result<Value, Value> {
    let realm = agent.current_realm_id();
    let source_text = JsString::from_str(agent, source);
    let script = parse_script(agent, source_text, realm, None)
        .unwrap_or_else(|errors| panic!("parse errors: {:?}", errors));
    let result = script_evaluation(agent, script).map_err(|error| error.value());
    agent.run_jobs();
    result
}

fn test_agent() -> Agent {
    let mut agent = Agent::new(Options::default(), &DefaultHostHooks);
    initialize_default_realm(&mut agent);
    agent
}

fn expect_number(agent: &mut Agent, source: &str, expected: f64) {
    let result = eval(agent, source).unwrap_or_else(|error| {
        let message = error.string_repr(agent);
        panic!(
            "`{}` threw: {}",
            source,
            message.to_string_lossy(agent)
        )
    });
    let Value::Number(number) = result else {
        panic!("`{}` did not produce a number: {:?}", source, result);
    };
    assert_eq!(number.into_f64(), expected, "`{}`", source);
}

fn expect_string(agent: &mut Agent, source: &str, expected: &str) {
    let result = eval(agent, source).expect("script threw");
    let Value::String(string) = result else {
        panic!("`{}` did not produce a string: {:?}", source, result);
    };
    assert_eq!(string.to_string_lossy(agent), expected, "`{}`", source);
}

fn expect_boolean(agent: &mut Agent, source: &str, expected: bool) {
    let result = eval(agent, source).expect("script threw");
    assert_eq!(result, Value::Boolean(expected), "`{}`", source);
}

#[test]
fn basic_arithmetic_in_a_function_call() {
    let mut agent = test_agent();
    expect_number(&mut agent, "(function(){ return 1 + 2; })()", 3.0);
    expect_number(&mut agent, "1.5 * 4", 6.0);
    expect_string(&mut agent, "'a' + 1", "a1");
}

#[test]
fn shift_counts_are_masked() {
    let mut agent = test_agent();
    // The shift count is masked with 0x1F before application.
    expect_number(&mut agent, "1 << 33", 2.0);
    expect_number(&mut agent, "(-1) >>> 0", 4294967295.0);
    expect_number(&mut agent, "~5", -6.0);
}

#[test]
fn array_sort_with_and_without_comparator() {
    let mut agent = test_agent();
    expect_string(&mut agent, "[3,1,2].sort().join(',')", "1,2,3");
    // A comparator returning NaN is treated as returning zero.
    expect_string(
        &mut agent,
        "[3,1,2].sort(function(a, b){ return NaN; }).join(',')",
        "3,1,2",
    );
    expect_string(
        &mut agent,
        "[3,1,2].sort(function(a, b){ return a - b; }).join(',')",
        "1,2,3",
    );
}

#[test]
fn sparse_array_length() {
    let mut agent = test_agent();
    expect_number(
        &mut agent,
        "var a = []; a[4294967294] = 1; a.length",
        4294967295.0,
    );
    expect_number(
        &mut agent,
        "var b = []; b[4294967294] = 1; b.length = 0; b.length",
        0.0,
    );
    expect_boolean(
        &mut agent,
        "var c = []; c[4294967294] = 1; c.length = 0; c[4294967294] === undefined",
        true,
    );
}

#[test]
fn define_property_defaults_and_immutability() {
    let mut agent = test_agent();
    // Missing attributes default to false / undefined.
    expect_string(
        &mut agent,
        "var o = Object.defineProperty({}, 'x', { value: 1 });
         var d = Object.getOwnPropertyDescriptor(o, 'x');
         [d.value, d.writable, d.enumerable, d.configurable].join(',')",
        "1,false,false,false",
    );
    // A non-configurable non-writable data property rejects value changes.
    expect_boolean(
        &mut agent,
        "var o2 = Object.defineProperty({}, 'x', { value: 1 });
         var threw = false;
         try { Object.defineProperty(o2, 'x', { value: 2 }); }
         catch (e) { threw = e instanceof TypeError; }
         threw",
        true,
    );
}

#[test]
fn promise_reactions_run_from_the_job_queue() {
    let mut agent = test_agent();
    expect_number(
        &mut agent,
        "var result = 0;
         Promise.resolve(1).then(function(v){ result = v + 1; });
         result",
        // The reaction has not run yet: jobs drain after the script.
        0.0,
    );
    expect_number(&mut agent, "result", 2.0);
}

#[test]
fn closures_capture_their_environment() {
    let mut agent = test_agent();
    expect_number(
        &mut agent,
        "function counter() {
           var count = 0;
           return function() { count = count + 1; return count; };
         }
         var c = counter();
         c(); c(); c()",
        3.0,
    );
}

#[test]
fn try_catch_finally_ordering() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "var log = [];
         function f() {
           try {
             log.push('try');
             throw new Error('boom');
           } catch (e) {
             log.push('catch:' + e.message);
             return 'from-catch';
           } finally {
             log.push('finally');
           }
         }
         log.push(f());
         log.join('|')",
        "try|catch:boom|finally|from-catch",
    );
}

#[test]
fn generators_suspend_and_resume() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "function* gen() { var x = yield 1; yield x + 1; }
         var g = gen();
         var first = g.next();
         var second = g.next(10);
         var third = g.next();
         [first.value, first.done, second.value, second.done, third.value, third.done].join(',')",
        "1,false,11,false,,true",
    );
}

#[test]
fn generator_return_and_throw() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "function* gen() { try { yield 1; yield 2; } finally { cleaned = true; } }
         var cleaned = false;
         var g = gen();
         g.next();
         var r = g.return(42);
         [r.value, r.done, cleaned].join(',')",
        "42,true,true",
    );
}

#[test]
fn async_functions_settle_through_the_job_queue() {
    let mut agent = test_agent();
    expect_number(
        &mut agent,
        "var got = 0;
         (async function() {
           var v = await Promise.resolve(20);
           return v + 1;
         })().then(function(v) { got = v; });
         got",
        0.0,
    );
    expect_number(&mut agent, "got", 21.0);
}

#[test]
fn async_generators_yield_awaited_values() {
    let mut agent = test_agent();
    // (async function*(){ yield 1; yield await Promise.resolve(2); })()
    // iterated three times yields {1,false}, {2,false}, {undefined,true}.
    expect_string(
        &mut agent,
        "var results = [];
         var it = (async function*(){ yield 1; yield await Promise.resolve(2); })();
         it.next().then(function(r){ results.push(r.value + ':' + r.done); });
         it.next().then(function(r){ results.push(r.value + ':' + r.done); });
         it.next().then(function(r){ results.push(r.value + ':' + r.done); });
         results.join()",
        "",
    );
    expect_string(
        &mut agent,
        "results.join('|')",
        "1:false|2:false|undefined:true",
    );
}

#[test]
fn classes_with_private_and_static_members() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "class Counter {
           #count = 0;
           static created = 0;
           constructor() { Counter.created = Counter.created + 1; }
           increment() { this.#count = this.#count + 1; return this.#count; }
           has(value) { return #count in value; }
         }
         var c = new Counter();
         c.increment();
         c.increment();
         [c.increment(), Counter.created, c.has(c), c.has({})].join(',')",
        "3,1,true,false",
    );
}

#[test]
fn class_inheritance_and_super() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "class Animal {
           constructor(name) { this.name = name; }
           speak() { return this.name + ' makes a sound'; }
         }
         class Dog extends Animal {
           speak() { return super.speak() + ': woof'; }
         }
         new Dog('Rex').speak()",
        "Rex makes a sound: woof",
    );
}

#[test]
fn proxies_trap_gets() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "var target = { x: 'base' };
         var proxy = new Proxy(target, {
           get: function(t, key) { return key === 'x' ? t[key] + '!' : 'missing'; }
         });
         [proxy.x, proxy.y].join(',')",
        "base!,missing",
    );
    // Revocation nulls the target/handler pair; every trap checks.
    expect_boolean(
        &mut agent,
        "var pair = Proxy.revocable({}, {});
         pair.revoke();
         var threw = false;
         try { pair.proxy.x; } catch (e) { threw = e instanceof TypeError; }
         threw",
        true,
    );
}

#[test]
fn data_view_round_trips_and_bounds() {
    let mut agent = test_agent();
    expect_number(
        &mut agent,
        "var buffer = new ArrayBuffer(8);
         var view = new DataView(buffer);
         view.setFloat64(0, 1.5, true);
         view.getFloat64(0, true)",
        1.5,
    );
    // getIndex + elementSize > viewSize throws a RangeError.
    expect_boolean(
        &mut agent,
        "var threw = false;
         try { view.getFloat64(1); } catch (e) { threw = e instanceof RangeError; }
         threw",
        true,
    );
    // Endianness round-trips through the same byte interpretation.
    expect_number(
        &mut agent,
        "view.setInt16(0, -2, false); view.getInt16(0, false)",
        -2.0,
    );
}

#[test]
fn uint8_clamped_rounds_to_even() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "var a = new Uint8ClampedArray(4);
         a[0] = 0.5; a[1] = 1.5; a[2] = 2.5; a[3] = 300;
         [a[0], a[1], a[2], a[3]].join(',')",
        "0,2,2,255",
    );
}

#[test]
fn iteration_protocol_over_arrays_and_objects() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "var out = [];
         for (var value of [10, 20, 30]) { out.push(value); }
         out.join(',')",
        "10,20,30",
    );
    expect_string(
        &mut agent,
        "var keys = [];
         for (var key in { a: 1, b: 2 }) { keys.push(key); }
         keys.join(',')",
        "a,b",
    );
}

#[test]
fn labelled_break_and_continue() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "var out = [];
         outer: for (var i = 0; i < 3; i = i + 1) {
           for (var j = 0; j < 3; j = j + 1) {
             if (j > i) { continue outer; }
             if (i === 2 && j === 1) { break outer; }
             out.push(i + ':' + j);
           }
         }
         out.join(',')",
        "0:0,1:0,1:1,2:0",
    );
}

#[test]
fn switch_matches_with_strict_equality_and_falls_through() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "function classify(x) {
           var out = [];
           switch (x) {
             case '1': out.push('string-one');
             case 1: out.push('one'); break;
             default: out.push('other');
           }
           return out.join(',');
         }
         [classify(1), classify('1'), classify(2)].join('|')",
        "one|string-one,one|other",
    );
}

#[test]
fn destructuring_bindings() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "var [a, b = 5, ...rest] = [1, undefined, 3, 4];
         var { x, y: renamed } = { x: 'ex', y: 'why' };
         [a, b, rest.join('-'), x, renamed].join(',')",
        "1,5,3-4,ex,why",
    );
}

#[test]
fn mapped_arguments_reflect_parameter_writes() {
    let mut agent = test_agent();
    expect_string(
        &mut agent,
        "function f(a) {
           a = 'changed';
           var observed = arguments[0];
           arguments[0] = 'mapped';
           return observed + ',' + a;
         }
         f('original')",
        "changed,mapped",
    );
}

#[test]
fn module_namespace_is_sorted_and_frozen() {
    // Module linking through a host that resolves inline sources.
    use kestrel_vm::ecmascript::execution::agent::{
        HostHooks, LoadPayload, Referrer,
    };
    use kestrel_vm::ecmascript::scripts_and_modules::module::{
        evaluate_module, finish_loading_imported_module, link_module, load_requested_modules,
        parse_module,
    };

    #[derive(Debug)]
    struct InlineModuleHost;
    impl HostHooks for InlineModuleHost {
        fn load_imported_module(
            &self,
            agent: &mut Agent,
            referrer: Referrer,
            specifier: String,
            payload: LoadPayload,
        ) {
            let source = match specifier.as_str() {
                "zoo" => "export var zebra = 'z'; export var aardvark = 'a';",
                _ => panic!("unexpected specifier {}", specifier),
            };
            let realm = agent.current_realm_id();
            let source_text = JsString::from_str(agent, source);
            let specifier_string = JsString::from_string(agent, specifier.clone());
            let module = parse_module(agent, source_text, realm, specifier_string)
                .expect("module parses");
            finish_loading_imported_module(agent, referrer, specifier, payload, Ok(module));
        }
    }

    let mut agent = Agent::new(Options::default(), &InlineModuleHost);
    initialize_default_realm(&mut agent);
    let realm = agent.current_realm_id();
    let source = JsString::from_str(
        &mut agent,
        "import * as ns from 'zoo';
         globalThis.names = Object.keys(ns).join(',');
         globalThis.writes = false;
         try { ns.zebra = 'changed'; } catch (e) { globalThis.writes = true; }",
    );
    let specifier = JsString::from_str(&mut agent, "main");
    let module = parse_module(&mut agent, source, realm, specifier).expect("module parses");
    load_requested_modules(&mut agent, module);
    agent.run_jobs();
    link_module(&mut agent, module).expect("module links");
    evaluate_module(&mut agent, module);
    agent.run_jobs();

    // Namespace string keys are sorted lexicographically and Set fails.
    expect_string(&mut agent, "globalThis.names", "aardvark,zebra");
    // The module body is strict mode code, so the failed Set threw.
    expect_boolean(&mut agent, "globalThis.writes", true);
}
