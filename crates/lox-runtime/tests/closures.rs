//! Closure capture and static scoping

mod common;

use common::{assert_prints, assert_runtime_error};

#[test]
fn test_closures_share_captured_frame() {
    assert_prints(
        "var get; var set;
         fun pair() {
             var value = \"start\";
             fun g() { return value; }
             fun s(v) { value = v; }
             get = g;
             set = s;
         }
         pair();
         print get();
         set(\"changed\");
         print get();",
        "start\nchanged\n",
    );
}

#[test]
fn test_each_call_gets_fresh_frame() {
    assert_prints(
        "fun counter() {
             var n = 0;
             return fun () { n = n + 1; return n; };
         }
         var a = counter();
         var b = counter();
         a(); a();
         print a();
         print b();",
        "3\n1\n",
    );
}

#[test]
fn test_closure_sees_later_assignment() {
    assert_prints(
        "fun outer() {
             var x = 1;
             fun read() { return x; }
             x = 2;
             return read;
         }
         print outer()();",
        "2\n",
    );
}

#[test]
fn test_closure_over_parameter() {
    assert_prints(
        "fun adder(n) { return fun (x) { return x + n; }; }
         var add5 = adder(5);
         print add5(10);",
        "15\n",
    );
}

#[test]
fn test_local_function_recursion() {
    assert_prints(
        "{
             fun fact(n) { return ifx n <= 1 1 n * fact(n - 1); }
             print fact(5);
         }",
        "120\n",
    );
}

#[test]
fn test_anonymous_function_bound_to_local_recurses() {
    assert_prints(
        "{
             var down = fun (n) { if n > 0 { print n; down(n - 1); } };
             down(2);
         }",
        "2\n1\n",
    );
}

#[test]
fn test_static_scope_is_fixed_at_resolution() {
    assert_prints(
        "var a = \"global\";
         {
             fun show() { print a; }
             show();
             var a = \"block\";
             show();
         }",
        "global\nglobal\n",
    );
}

#[test]
fn test_deeply_nested_capture() {
    assert_prints(
        "fun l1() {
             var a = \"a\";
             fun l2() {
                 var b = \"b\";
                 fun l3() { return a + b; }
                 return l3;
             }
             return l2();
         }
         print l1()();",
        "ab\n",
    );
}

#[test]
fn test_local_initializer_cannot_read_outer_name() {
    assert_runtime_error(
        "var a = 1; { var a = a + 1; print a; }",
        "Variable 'a' used before assignment.",
    );
}

#[test]
fn test_loop_closures_capture_their_iteration() {
    assert_prints(
        "var first; var second;
         for (var i = 0; i < 2; i = i + 1) {
             var j = i;
             fun f() { return j; }
             if i == 0 { first = f; } else { second = f; }
         }
         print first();
         print second();",
        "0\n1\n",
    );
}
