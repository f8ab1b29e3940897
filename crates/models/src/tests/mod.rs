mod dict_tests;
