mod visibility_tests;
